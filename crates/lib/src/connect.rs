//! Connection bookkeeping.
//!
//! A connection `parent -> child` means the parent keeps the child mounted.
//! Connections are stored on the parent, keyed by the child's path string,
//! and are only ever added here; removal belongs to the mount layer.

use tracing::trace;

use crate::context::Context;
use crate::error::BuildError;
use crate::logic::LogicId;

impl Context {
  /// Whether `parent` already has an entry for `path_string`.
  pub fn is_connected(&self, parent: LogicId, path_string: &str) -> Result<bool, BuildError> {
    Ok(self.try_logic(parent)?.connections.contains_key(path_string))
  }

  /// Connect `parent` to `child` and to everything `child` is connected to.
  ///
  /// Entries the parent already has are left alone, so adding the same
  /// connection twice is a no-op. The child's entries keep their order.
  pub fn add_connection(&mut self, parent: LogicId, child: LogicId) -> Result<(), BuildError> {
    let child_logic = self.try_logic(child)?;
    let child_path = child_logic.path_string().to_string();
    let inherited: Vec<(String, LogicId)> = child_logic
      .connections
      .iter()
      .map(|(path, id)| (path.clone(), *id))
      .collect();

    let parent_logic = self.try_logic_mut(parent)?;
    if parent_logic.connections.contains_key(&child_path) {
      return Ok(());
    }

    for (path, id) in inherited {
      parent_logic.connections.entry(path).or_insert(id);
    }
    parent_logic.connections.entry(child_path.clone()).or_insert(child);

    trace!(parent = %parent, child = %child_path, "added connection");
    Ok(())
  }
}
