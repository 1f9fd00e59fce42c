//! Logic construction.
//!
//! The builder turns a stack of inputs into a logic exactly once per path
//! string and hands out the cached logic on every later request.
//!
//! # Characteristics
//!
//! - **Cached**: a path string is constructed at most once while it is cached;
//!   later requests only refresh the stored props
//! - **Reentrant**: steps and hooks receive the context and may build further
//!   logic, which is connected to the logic under construction
//! - **Transactional**: a failed construction leaves no cache entry behind
//! - **Evicted listeners are ignored**: logic built while an evicted logic's
//!   handler runs is neither connected to it nor mounted

use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::error::BuildError;
use crate::inputs::{Input, Key, Props};
use crate::logic::{LogicId, Wrapper};
use crate::path::{Path, path_for_input, resolve_key};
use crate::plugin::HookCall;

impl Context {
  /// Build (or reuse) the logic for `inputs` with default wrapper and listener behavior.
  pub fn build(&mut self, inputs: &[Rc<Input>], props: Option<Props>) -> Result<LogicId, BuildError> {
    self.get_built_logic(inputs, props, None, true)
  }

  /// Return the logic identified by `inputs` and `props`, constructing it on first request.
  ///
  /// The first input decides key and path. On a cache hit only the stored
  /// props are replaced. When auto-connect is enabled the logic is connected
  /// to the logic under construction, or, with `auto_connect_in_listener`,
  /// to the logic whose handler is running (and mounted right away).
  ///
  /// # Errors
  ///
  /// - [`BuildError::NoInputs`] if `inputs` is empty
  /// - [`BuildError::MissingKey`] if the first input is keyed and the props yield no key
  /// - [`BuildError::CircularBuild`] if the path is already under construction
  /// - any error raised by a hook, build step, or the mount collaborator
  pub fn get_built_logic(
    &mut self,
    inputs: &[Rc<Input>],
    props: Option<Props>,
    wrapper: Option<Wrapper>,
    auto_connect_in_listener: bool,
  ) -> Result<LogicId, BuildError> {
    let input = inputs.first().ok_or(BuildError::NoInputs)?;
    let key = resolve_key(input, props.as_ref())?;
    let path = path_for_input(input, key.as_ref(), props.as_ref(), self.options())?;
    let path_string = path.to_path_string();

    let logic = match self.cached(&path_string) {
      Some(logic) => {
        debug!(path = %path_string, logic = %logic, "reusing cached logic");
        self.try_logic_mut(logic)?.props = props;
        logic
      }
      None => {
        if self.is_building(&path_string) {
          return Err(BuildError::CircularBuild { path: path_string });
        }
        let logic = self.build_logic(inputs, path, key, props, wrapper)?;
        self.build.cache.insert(path_string.clone(), logic);
        logic
      }
    };

    if self.options().auto_connect {
      self.auto_connect(logic, &path_string, auto_connect_in_listener)?;
    }

    Ok(logic)
  }

  /// Apply one more input to an already built logic.
  pub fn extend_logic(&mut self, logic: LogicId, input: &Input) -> Result<(), BuildError> {
    self.try_logic(logic)?;
    self.apply_input_tree(logic, input)
  }

  // Path string of a logic that is still the cached one for its path.
  fn live_path(&self, logic: LogicId) -> Option<String> {
    self
      .is_cached(logic)
      .then(|| self.logic(logic).map(|l| l.path_string().to_string()))
      .flatten()
  }

  fn is_building(&self, path_string: &str) -> bool {
    self
      .build
      .heap
      .iter()
      .any(|id| self.logic(*id).is_some_and(|l| l.path_string() == path_string))
  }

  // Does not consult the cache; the caller stores the result.
  fn build_logic(
    &mut self,
    inputs: &[Rc<Input>],
    path: Path,
    key: Option<Key>,
    props: Option<Props>,
    wrapper: Option<Wrapper>,
  ) -> Result<LogicId, BuildError> {
    let path_string = path.to_path_string();
    let logic = self.allocate_logic(key, path, props, wrapper);
    self.apply_defaults(logic)?;

    debug!(path = %path_string, logic = %logic, inputs = inputs.len(), "building logic");

    let built = self.with_build_scope(logic, |ctx| {
      ctx.run_plugins(HookCall::BeforeBuild(logic, inputs))?;

      for input in inputs {
        ctx.apply_input_tree(logic, input)?;
      }

      ctx.try_logic_mut(logic)?.connections.insert(path_string.clone(), logic);

      ctx.run_plugins(HookCall::AfterBuild(logic, inputs))
    });

    if let Err(err) = built {
      debug!(path = %path_string, error = %err, "build failed, discarding logic");
      self.logics.remove(&logic);
      return Err(err);
    }

    Ok(logic)
  }

  fn apply_defaults(&mut self, logic: LogicId) -> Result<(), BuildError> {
    let defaults: Vec<_> = self
      .plugins
      .activated()
      .iter()
      .filter_map(|plugin| plugin.defaults.as_ref().map(|defaults| defaults.resolve()))
      .collect();

    let fields = &mut self.try_logic_mut(logic)?.fields;
    for map in defaults {
      fields.extend(map);
    }
    Ok(())
  }

  fn apply_input_tree(&mut self, logic: LogicId, input: &Input) -> Result<(), BuildError> {
    self.apply_input(logic, input)?;
    for inner in input.extend() {
      self.apply_input_tree(logic, inner)?;
    }
    Ok(())
  }

  // Runs every step group in build order for one input.
  fn apply_input(&mut self, logic: LogicId, input: &Input) -> Result<(), BuildError> {
    self.run_plugins(HookCall::BeforeLogic(logic, input))?;

    let order = self.plugins.build_order().to_vec();
    for group in &order {
      let steps = self.plugins.steps(group).to_vec();
      for step in steps {
        trace!(logic = %logic, group = %group, input = %input.label(), "running build step");
        step(self, logic, input)?;
      }
    }

    self.run_plugins(HookCall::AfterLogic(logic, input))
  }

  fn auto_connect(&mut self, logic: LogicId, path_string: &str, in_listener: bool) -> Result<(), BuildError> {
    // Dependencies of logic under construction are always tracked.
    if let Some(&parent) = self.build.heap.last() {
      if !self.is_connected(parent, path_string)? {
        debug!(parent = %parent, path = %path_string, "connecting to logic under construction");
        self.add_connection(parent, logic)?;
      }
      return Ok(());
    }

    if in_listener && let Some(&running) = self.run.heap.last() {
      let Some(running_path) = self.live_path(running) else {
        warn!(running = %running, path = %path_string, "running logic is no longer cached, not connecting");
        return Ok(());
      };
      if self.is_connected(running, path_string)? {
        return Ok(());
      }

      debug!(running = %running, path = %path_string, "connecting to running logic");
      self.add_connection(running, logic)?;

      let count = self.mount_count(&running_path);
      // Unmounted later through the connection.
      self.mount_logic(logic, count)?;
    }

    Ok(())
  }
}
