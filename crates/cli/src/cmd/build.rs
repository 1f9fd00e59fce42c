//! Build command implementation.
//!
//! Builds one declared logic (and everything it connects to) and prints it.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use kiln_lib::{Key, Logic, Wrapper};

use super::{load_blueprint, parse_props};
use crate::output::{OutputFormat, print_json, print_stat, print_success, symbols};

#[derive(Debug, Serialize)]
struct LogicReport<'a> {
  path: &'a str,
  key: Option<&'a Key>,
  wrapper: Option<&'a Wrapper>,
  props: Option<&'a Value>,
  fields: &'a Map<String, Value>,
  connections: Vec<&'a str>,
}

impl<'a> From<&'a Logic> for LogicReport<'a> {
  fn from(logic: &'a Logic) -> Self {
    Self {
      path: logic.path_string(),
      key: logic.key(),
      wrapper: logic.wrapper(),
      props: logic.props(),
      fields: &logic.fields,
      connections: logic
        .connections()
        .keys()
        .map(String::as_str)
        .filter(|path| *path != logic.path_string())
        .collect(),
    }
  }
}

pub fn cmd_build(blueprint: &Path, name: &str, props: Option<&str>, output: OutputFormat) -> Result<()> {
  let (mut ctx, compiled) = load_blueprint(blueprint)?;
  let props = parse_props(props)?;

  let id = compiled
    .build(&mut ctx, name, props)
    .with_context(|| format!("Failed to build '{}'", name))?;
  let logic = ctx.try_logic(id)?;
  let report = LogicReport::from(logic);

  if output.is_json() {
    print_json(&report)?;
    return Ok(());
  }

  print_success(&format!("Built {}", report.path));
  if let Some(key) = report.key {
    print_stat("Key", key.as_str());
  }
  if let Some(wrapper) = report.wrapper {
    print_stat("Wrapper", &wrapper.0);
  }
  if let Some(props) = report.props {
    print_stat("Props", &props.to_string());
  }

  if !report.fields.is_empty() {
    println!();
    println!("Fields:");
    for (field, value) in report.fields {
      println!("  {} {} = {}", symbols::INFO, field, value);
    }
  }

  if !report.connections.is_empty() {
    println!();
    println!("Connections:");
    for path in &report.connections {
      println!("  {} {}", symbols::ARROW, path);
    }
  }

  Ok(())
}
