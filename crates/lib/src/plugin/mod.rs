//! Plugin registry and hook dispatch.
//!
//! Plugins are activated in order and dispatched in that same order. Build
//! steps are grouped by name; the registry keeps the ordered list of groups
//! and the steps registered under each.
//!
//! # Submodules
//!
//! - [`types`] - plugin records, hook signatures, and [`HookCall`]

mod types;

pub use types::*;

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use crate::context::Context;
use crate::error::BuildError;

/// Activated plugins plus the step pipeline they contributed.
#[derive(Default)]
pub struct PluginRegistry {
  activated: Vec<Rc<Plugin>>,
  build_order: Vec<String>,
  build_steps: HashMap<String, Vec<BuildStep>>,
}

impl PluginRegistry {
  pub fn activated(&self) -> &[Rc<Plugin>] {
    &self.activated
  }

  /// Step group names in the order they run.
  pub fn build_order(&self) -> &[String] {
    &self.build_order
  }

  /// Steps registered under `group`, in registration order.
  pub fn steps(&self, group: &str) -> &[BuildStep] {
    self.build_steps.get(group).map(Vec::as_slice).unwrap_or_default()
  }

  fn place_group(&mut self, plugin: &str, group: &str, placement: &StepPlacement) -> Result<(), BuildError> {
    if self.build_order.iter().any(|g| g == group) {
      debug!(plugin, group, "step group already registered");
      return Ok(());
    }

    let index = match placement {
      StepPlacement::End => self.build_order.len(),
      StepPlacement::Before(anchor) | StepPlacement::After(anchor) => {
        let position = self
          .build_order
          .iter()
          .position(|g| g == anchor)
          .ok_or_else(|| BuildError::UnknownStepGroup {
            plugin: plugin.to_string(),
            group: group.to_string(),
            anchor: anchor.clone(),
          })?;
        if matches!(placement, StepPlacement::After(_)) {
          position + 1
        } else {
          position
        }
      }
    };

    self.build_order.insert(index, group.to_string());
    Ok(())
  }

  fn activate(&mut self, plugin: Plugin) -> Result<(), BuildError> {
    if self.activated.iter().any(|p| p.name == plugin.name) {
      warn!(plugin = %plugin.name, "plugin activated more than once");
    }

    for (group, placement) in &plugin.build_order {
      self.place_group(&plugin.name, group, placement)?;
    }

    for (group, step) in &plugin.build_steps {
      if !self.build_order.iter().any(|g| g == group) {
        self.build_order.push(group.clone());
      }
      self.build_steps.entry(group.clone()).or_default().push(step.clone());
    }

    info!(
      plugin = %plugin.name,
      hooks = ?plugin.events.names(),
      steps = plugin.build_steps.len(),
      "activated plugin"
    );
    self.activated.push(Rc::new(plugin));
    Ok(())
  }

  fn clear(&mut self) {
    for plugin in &self.activated {
      if let Some(clear_cache) = &plugin.events.clear_cache {
        clear_cache();
      }
    }
    self.activated.clear();
    self.build_order.clear();
    self.build_steps.clear();
  }
}

impl Context {
  /// Append a plugin to the activated list and register its step groups and steps.
  pub fn activate_plugin(&mut self, plugin: Plugin) -> Result<(), BuildError> {
    self.plugins.activate(plugin)
  }

  /// Run every plugin's `clear_cache` hook, then forget all plugins and steps.
  pub fn clear_activated_plugins(&mut self) {
    self.plugins.clear();
  }

  /// Invoke a hook on every activated plugin that implements it, in activation order.
  ///
  /// The first error stops dispatch and is returned as is.
  pub fn run_plugins(&mut self, call: HookCall<'_>) -> Result<(), BuildError> {
    let plugins = self.plugins.activated.clone();

    for plugin in &plugins {
      let events = &plugin.events;
      let ran = match call {
        HookCall::BeforeBuild(logic, inputs) => run_hook(&events.before_build, |hook| hook(self, logic, inputs))?,
        HookCall::AfterBuild(logic, inputs) => run_hook(&events.after_build, |hook| hook(self, logic, inputs))?,
        HookCall::BeforeLogic(logic, input) => run_hook(&events.before_logic, |hook| hook(self, logic, input))?,
        HookCall::AfterLogic(logic, input) => run_hook(&events.after_logic, |hook| hook(self, logic, input))?,
        HookCall::MountedPath(path, logic) => run_hook(&events.mounted_path, |hook| hook(self, path, logic))?,
        HookCall::UnmountedPath(path, logic) => run_hook(&events.unmounted_path, |hook| hook(self, path, logic))?,
      };
      if ran {
        trace!(plugin = %plugin.name, hook = call.name(), "ran plugin hook");
      }
    }

    Ok(())
  }
}

fn run_hook<H>(hook: &Option<H>, call: impl FnOnce(&H) -> Result<(), BuildError>) -> Result<bool, BuildError> {
  match hook {
    Some(hook) => call(hook).map(|_| true),
    None => Ok(false),
  }
}
