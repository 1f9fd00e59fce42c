//! Declarative blueprints.
//!
//! A blueprint names a set of logics in JSON and compiles them into inputs.
//! [`blueprint_plugin`] supplies the two build steps the declarations need:
//!
//! - `connect` builds every declared dependency with the parent's props and
//!   connects it to the parent
//! - `fields` merges the declared fields onto the logic
//!
//! ```json
//! {
//!   "logics": {
//!     "item":  { "path": ["item"], "key": "id", "connect": ["store"] },
//!     "store": { "path": ["store"], "fields": { "items": [] } }
//!   }
//! }
//! ```

mod types;

pub use types::*;

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use serde_json::{Value, json};
use tracing::debug;

use crate::context::Context;
use crate::error::BuildError;
use crate::inputs::{Input, Props};
use crate::logic::{LogicId, Wrapper};
use crate::options::Options;
use crate::plugin::{Plugin, StepPlacement};

const CONNECT: &str = "connect";
const FIELDS: &str = "fields";

impl Blueprint {
  pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn from_file(path: &Path) -> Result<Self, BlueprintError> {
    let content = std::fs::read_to_string(path).map_err(|source| BlueprintError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Turn every declaration into an input, resolving `extend` and checking `connect`.
  pub fn compile(&self) -> Result<CompiledBlueprint, BlueprintError> {
    for (name, decl) in &self.logics {
      if let Some(missing) = decl.connect.iter().find(|dep| !self.logics.contains_key(*dep)) {
        return Err(BlueprintError::UnknownLogic {
          name: missing.clone(),
          referenced_by: name.clone(),
        });
      }
    }

    let mut inputs = BTreeMap::new();
    for name in self.logics.keys() {
      self.compile_decl(name, &mut inputs, &mut Vec::new())?;
    }

    debug!(logics = inputs.len(), "compiled blueprint");
    Ok(CompiledBlueprint {
      inputs,
      options: self.options.clone().unwrap_or_default(),
    })
  }

  fn compile_decl(
    &self,
    name: &str,
    compiled: &mut BTreeMap<String, Rc<Input>>,
    stack: &mut Vec<String>,
  ) -> Result<Rc<Input>, BlueprintError> {
    if let Some(input) = compiled.get(name) {
      return Ok(input.clone());
    }

    if stack.iter().any(|n| n == name) {
      let mut chain = stack.clone();
      chain.push(name.to_string());
      return Err(BlueprintError::ExtendCycle {
        chain: chain.join(" -> "),
      });
    }

    let decl = self.logics.get(name).ok_or_else(|| BlueprintError::UnknownLogic {
      name: name.to_string(),
      referenced_by: stack.last().cloned().unwrap_or_default(),
    })?;

    let mut input = Input::named(name);
    if let Some(prop) = &decl.key {
      input = input.with_key_prop(prop);
    }
    if let Some(path) = &decl.path {
      input = match decl.key {
        Some(_) => {
          let base = path.clone();
          input.with_path_fn(move |key, _| {
            let mut segments = base.clone();
            segments.extend(key.map(|k| k.to_string()));
            segments
          })
        }
        None => input.with_path(path.clone()),
      };
    }
    input = input
      .with_data(CONNECT, json!(decl.connect))
      .with_data(FIELDS, Value::Object(decl.fields.clone()));

    stack.push(name.to_string());
    for parent in &decl.extend {
      let inner = self.compile_decl(parent, compiled, stack)?;
      input = input.with_extend(inner);
    }
    stack.pop();

    let input = Rc::new(input);
    compiled.insert(name.to_string(), input.clone());
    Ok(input)
  }
}

/// A blueprint whose declarations have been turned into inputs.
///
/// Inputs are created once, so building the same name twice hits the cache
/// even for declarations without an explicit path.
#[derive(Debug)]
pub struct CompiledBlueprint {
  inputs: BTreeMap<String, Rc<Input>>,
  options: Options,
}

impl CompiledBlueprint {
  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.inputs.keys().map(String::as_str)
  }

  pub fn inputs(&self, name: &str) -> Option<Vec<Rc<Input>>> {
    self.inputs.get(name).map(|input| vec![input.clone()])
  }

  pub fn is_keyed(&self, name: &str) -> bool {
    self.inputs.get(name).is_some_and(|input| input.has_key())
  }

  /// Build the named logic, tagging it with the declaration name as wrapper.
  pub fn build(&self, ctx: &mut Context, name: &str, props: Option<Props>) -> Result<LogicId, BuildError> {
    let inputs = self
      .inputs(name)
      .ok_or_else(|| anyhow::Error::new(BlueprintError::Undeclared { name: name.to_string() }))?;
    ctx.get_built_logic(&inputs, props, Some(Wrapper::from(name)), true)
  }
}

/// The plugin providing the `connect` and `fields` build steps.
pub fn blueprint_plugin(blueprint: Rc<CompiledBlueprint>) -> Plugin {
  Plugin::new("blueprint")
    .with_step_group(CONNECT, StepPlacement::End)
    .with_step_group(FIELDS, StepPlacement::After(CONNECT.to_string()))
    .with_build_step(CONNECT, move |ctx, logic, input| {
      let Some(names) = input.data().get(CONNECT).and_then(Value::as_array) else {
        return Ok(());
      };

      let props = ctx.try_logic(logic)?.props().cloned();
      for name in names.iter().filter_map(Value::as_str) {
        let dependency = blueprint.build(ctx, name, props.clone())?;
        ctx.add_connection(logic, dependency)?;
      }
      Ok(())
    })
    .with_build_step(FIELDS, |ctx, logic, input| {
      if let Some(Value::Object(fields)) = input.data().get(FIELDS) {
        ctx.try_logic_mut(logic)?.fields.extend(fields.clone());
      }
      Ok(())
    })
}
