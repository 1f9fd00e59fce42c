//! Plugin types.
//!
//! A plugin is a record of optional hook functions drawn from a fixed set
//! ([`PluginEvents`]), plus optional logic defaults and build steps.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::BuildError;
use crate::inputs::Input;
use crate::logic::LogicId;

/// Hook receiving the logic and the full input stack (`before_build`, `after_build`).
pub type BuildHook = Rc<dyn Fn(&mut Context, LogicId, &[Rc<Input>]) -> Result<(), BuildError>>;

/// Hook receiving the logic and one input (`before_logic`, `after_logic`).
pub type InputHook = Rc<dyn Fn(&mut Context, LogicId, &Input) -> Result<(), BuildError>>;

/// Hook receiving a path string and its logic (`mounted_path`, `unmounted_path`).
pub type PathHook = Rc<dyn Fn(&mut Context, &str, LogicId) -> Result<(), BuildError>>;

/// Teardown hook run by `clear_activated_plugins`.
pub type ClearHook = Rc<dyn Fn()>;

/// One build step, applied to the logic for every input.
pub type BuildStep = Rc<dyn Fn(&mut Context, LogicId, &Input) -> Result<(), BuildError>>;

/// Fields merged onto every newly built logic.
#[derive(Clone)]
pub enum Defaults {
  Value(Map<String, Value>),
  Factory(Rc<dyn Fn() -> Map<String, Value>>),
}

impl Defaults {
  pub fn resolve(&self) -> Map<String, Value> {
    match self {
      Defaults::Value(map) => map.clone(),
      Defaults::Factory(factory) => factory(),
    }
  }
}

impl fmt::Debug for Defaults {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Defaults::Value(map) => f.debug_tuple("Value").field(map).finish(),
      Defaults::Factory(_) => f.write_str("Factory(..)"),
    }
  }
}

/// Where a plugin's step group goes in the build order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPlacement {
  End,
  Before(String),
  After(String),
}

/// The fixed set of hooks a plugin may implement.
#[derive(Clone, Default)]
pub struct PluginEvents {
  pub before_build: Option<BuildHook>,
  pub after_build: Option<BuildHook>,
  pub before_logic: Option<InputHook>,
  pub after_logic: Option<InputHook>,
  pub mounted_path: Option<PathHook>,
  pub unmounted_path: Option<PathHook>,
  pub clear_cache: Option<ClearHook>,
}

impl PluginEvents {
  /// Names of the hooks that are present, for logging.
  pub fn names(&self) -> Vec<&'static str> {
    [
      ("before_build", self.before_build.is_some()),
      ("after_build", self.after_build.is_some()),
      ("before_logic", self.before_logic.is_some()),
      ("after_logic", self.after_logic.is_some()),
      ("mounted_path", self.mounted_path.is_some()),
      ("unmounted_path", self.unmounted_path.is_some()),
      ("clear_cache", self.clear_cache.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, present)| present.then_some(name))
    .collect()
  }
}

/// A named plugin.
#[derive(Clone)]
pub struct Plugin {
  pub name: String,
  pub defaults: Option<Defaults>,
  pub build_order: Vec<(String, StepPlacement)>,
  pub build_steps: Vec<(String, BuildStep)>,
  pub events: PluginEvents,
}

impl Plugin {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      defaults: None,
      build_order: Vec::new(),
      build_steps: Vec::new(),
      events: PluginEvents::default(),
    }
  }

  pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
    self.defaults = Some(Defaults::Value(defaults));
    self
  }

  pub fn with_defaults_fn(mut self, factory: impl Fn() -> Map<String, Value> + 'static) -> Self {
    self.defaults = Some(Defaults::Factory(Rc::new(factory)));
    self
  }

  pub fn with_step_group(mut self, group: &str, placement: StepPlacement) -> Self {
    self.build_order.push((group.to_string(), placement));
    self
  }

  pub fn with_build_step(
    mut self,
    group: &str,
    step: impl Fn(&mut Context, LogicId, &Input) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.build_steps.push((group.to_string(), Rc::new(step)));
    self
  }

  pub fn on_before_build(
    mut self,
    hook: impl Fn(&mut Context, LogicId, &[Rc<Input>]) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.events.before_build = Some(Rc::new(hook));
    self
  }

  pub fn on_after_build(
    mut self,
    hook: impl Fn(&mut Context, LogicId, &[Rc<Input>]) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.events.after_build = Some(Rc::new(hook));
    self
  }

  pub fn on_before_logic(
    mut self,
    hook: impl Fn(&mut Context, LogicId, &Input) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.events.before_logic = Some(Rc::new(hook));
    self
  }

  pub fn on_after_logic(
    mut self,
    hook: impl Fn(&mut Context, LogicId, &Input) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.events.after_logic = Some(Rc::new(hook));
    self
  }

  pub fn on_mounted_path(
    mut self,
    hook: impl Fn(&mut Context, &str, LogicId) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.events.mounted_path = Some(Rc::new(hook));
    self
  }

  pub fn on_unmounted_path(
    mut self,
    hook: impl Fn(&mut Context, &str, LogicId) -> Result<(), BuildError> + 'static,
  ) -> Self {
    self.events.unmounted_path = Some(Rc::new(hook));
    self
  }

  pub fn on_clear_cache(mut self, hook: impl Fn() + 'static) -> Self {
    self.events.clear_cache = Some(Rc::new(hook));
    self
  }
}

impl fmt::Debug for Plugin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Plugin")
      .field("name", &self.name)
      .field("defaults", &self.defaults)
      .field("build_order", &self.build_order)
      .field(
        "build_steps",
        &self.build_steps.iter().map(|(group, _)| group).collect::<Vec<_>>(),
      )
      .field("events", &self.events.names())
      .finish()
  }
}

/// One dispatch of a hook, with exactly the arguments that hook receives.
#[derive(Clone, Copy)]
pub enum HookCall<'a> {
  BeforeBuild(LogicId, &'a [Rc<Input>]),
  AfterBuild(LogicId, &'a [Rc<Input>]),
  BeforeLogic(LogicId, &'a Input),
  AfterLogic(LogicId, &'a Input),
  MountedPath(&'a str, LogicId),
  UnmountedPath(&'a str, LogicId),
}

impl HookCall<'_> {
  pub fn name(&self) -> &'static str {
    match self {
      HookCall::BeforeBuild(..) => "before_build",
      HookCall::AfterBuild(..) => "after_build",
      HookCall::BeforeLogic(..) => "before_logic",
      HookCall::AfterLogic(..) => "after_logic",
      HookCall::MountedPath(..) => "mounted_path",
      HookCall::UnmountedPath(..) => "unmounted_path",
    }
  }
}
