//! Graph command implementation.
//!
//! Builds every declared logic and prints the resulting connection graph.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use kiln_lib::{BuildError, ConnectionGraph};

use super::{load_blueprint, parse_props};
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success, print_warning, symbols};

/// A declaration left out because it, or a logic it connects to, has no key.
#[derive(Debug, Serialize)]
struct Skipped<'a> {
  name: &'a str,
  input: String,
}

pub fn cmd_graph(blueprint: &Path, props: Option<&str>, output: OutputFormat) -> Result<()> {
  let (mut ctx, compiled) = load_blueprint(blueprint)?;
  let props = parse_props(props)?;

  let mut skipped = Vec::new();
  let names: Vec<String> = compiled.names().map(str::to_string).collect();
  for name in &names {
    match compiled.build(&mut ctx, name, props.clone()) {
      Ok(_) => {}
      Err(BuildError::MissingKey { input }) => {
        debug!(name = %name, input = %input, "skipping logic without a key");
        skipped.push(Skipped { name: name.as_str(), input });
      }
      Err(err) => return Err(err.into()),
    }
  }

  let graph = ConnectionGraph::from_context(&ctx);
  let mount_order = graph.mount_order().ok();

  if output.is_json() {
    print_json(&json!({
      "nodes": graph.len(),
      "edges": graph.edges(),
      "cyclic": graph.is_cyclic(),
      "mount_order": mount_order,
      "skipped": skipped,
    }))?;
    return Ok(());
  }

  print_success(&format!("Built {} logic(s)", ctx.cache_len()));
  print_stat("Nodes", &graph.len().to_string());
  print_stat("Edges", &graph.edges().len().to_string());
  for skip in &skipped {
    if skip.name == skip.input {
      print_info(&format!("Skipped '{}': no key in props", skip.name));
    } else {
      print_info(&format!("Skipped '{}': '{}' has no key in props", skip.name, skip.input));
    }
  }

  if !graph.edges().is_empty() {
    println!();
    println!("Connections:");
    for (dependent, dependency) in graph.edges() {
      println!("  {} {} {}", dependent, symbols::ARROW, dependency);
    }
  }

  println!();
  match mount_order {
    Some(order) => {
      println!("Mount order:");
      for (position, path) in order.iter().enumerate() {
        println!("  {}. {}", position + 1, path);
      }
    }
    None => print_warning("Connections are cyclic; no mount order exists"),
  }

  Ok(())
}
