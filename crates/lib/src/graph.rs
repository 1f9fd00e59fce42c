//! Connection graph analysis.
//!
//! A [`ConnectionGraph`] is a read-only snapshot of the connections between
//! cached logics, used for inspection: who depends on whom, whether the graph
//! is cyclic, and in which order paths would be mounted.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::context::Context;

#[derive(Debug, Error)]
pub enum GraphError {
  /// The connections form a cycle, so no mount order exists.
  #[error("connection cycle detected at '{path}'")]
  Cycle { path: String },
}

/// Snapshot of the connection graph, with edges from dependency to dependent.
pub struct ConnectionGraph {
  graph: DiGraph<String, ()>,
  nodes: HashMap<String, NodeIndex>,
}

impl ConnectionGraph {
  /// Snapshot every cached logic and its connections (self entries omitted).
  ///
  /// Connection targets that are no longer cached still appear as nodes.
  pub fn from_context(ctx: &Context) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

    let entries = ctx.cache_entries();
    for (path, _) in &entries {
      let idx = graph.add_node(path.to_string());
      nodes.insert(path.to_string(), idx);
    }

    for (path, id) in &entries {
      let Some(logic) = ctx.logic(*id) else {
        continue;
      };
      let dependent = nodes[*path];

      for dep_path in logic.connections().keys() {
        if dep_path == path {
          continue;
        }
        let dependency = *nodes
          .entry(dep_path.clone())
          .or_insert_with(|| graph.add_node(dep_path.clone()));
        graph.update_edge(dependency, dependent, ());
      }
    }

    Self { graph, nodes }
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  pub fn contains(&self, path: &str) -> bool {
    self.nodes.contains_key(path)
  }

  /// Paths `path` is connected to, sorted.
  pub fn dependencies(&self, path: &str) -> Vec<&str> {
    self.neighbors(path, Direction::Incoming)
  }

  /// Paths connected to `path`, sorted.
  pub fn dependents(&self, path: &str) -> Vec<&str> {
    self.neighbors(path, Direction::Outgoing)
  }

  fn neighbors(&self, path: &str, direction: Direction) -> Vec<&str> {
    let Some(&idx) = self.nodes.get(path) else {
      return Vec::new();
    };

    let mut paths: Vec<&str> = self
      .graph
      .neighbors_directed(idx, direction)
      .map(|n| self.graph[n].as_str())
      .collect();
    paths.sort_unstable();
    paths
  }

  /// All edges as `(dependent, dependency)` pairs, sorted.
  pub fn edges(&self) -> Vec<(&str, &str)> {
    let mut edges: Vec<(&str, &str)> = self
      .graph
      .edge_indices()
      .filter_map(|e| self.graph.edge_endpoints(e))
      .map(|(dependency, dependent)| (self.graph[dependent].as_str(), self.graph[dependency].as_str()))
      .collect();
    edges.sort_unstable();
    edges
  }

  pub fn is_cyclic(&self) -> bool {
    is_cyclic_directed(&self.graph)
  }

  /// Paths ordered so that every dependency comes before its dependents.
  pub fn mount_order(&self) -> Result<Vec<String>, GraphError> {
    let sorted = toposort(&self.graph, None).map_err(|cycle| GraphError::Cycle {
      path: self.graph[cycle.node_id()].clone(),
    })?;

    Ok(sorted.into_iter().map(|idx| self.graph[idx].clone()).collect())
  }

  /// Paths grouped into levels: level 0 has no dependencies, and every path
  /// sits one level above its deepest dependency.
  pub fn levels(&self) -> Result<Vec<Vec<String>>, GraphError> {
    let mut in_degree: HashMap<NodeIndex, usize> = self
      .graph
      .node_indices()
      .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();
    let mut remaining: HashSet<NodeIndex> = self.graph.node_indices().collect();
    let mut levels: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut level = 0;

    while !remaining.is_empty() {
      let ready: Vec<NodeIndex> = remaining.iter().filter(|idx| in_degree[*idx] == 0).copied().collect();

      if ready.is_empty() {
        let stuck = remaining.iter().map(|idx| self.graph[*idx].clone()).min().unwrap_or_default();
        return Err(GraphError::Cycle { path: stuck });
      }

      for idx in &ready {
        remaining.remove(idx);
        levels.entry(level).or_default().push(self.graph[*idx].clone());

        for dependent in self.graph.neighbors_directed(*idx, Direction::Outgoing) {
          if let Some(degree) = in_degree.get_mut(&dependent) {
            *degree = degree.saturating_sub(1);
          }
        }
      }

      level += 1;
    }

    Ok(
      levels
        .into_values()
        .map(|mut paths| {
          paths.sort();
          paths
        })
        .collect(),
    )
  }
}
