//! The build context.
//!
//! A [`Context`] owns everything the builder shares between calls: the build
//! cache, the build and run heaps, the mount counter, the plugin registry and
//! the logic arena. It is passed explicitly to every hook and step, which is
//! what makes nested builds possible. One context per embedding (or per test)
//! replaces ambient global state.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::BuildError;
use crate::inputs::{Key, Props};
use crate::logic::{Logic, LogicId, Wrapper};
use crate::mount::{MountLogic, RefCountMount};
use crate::options::Options;
use crate::path::Path;
use crate::plugin::PluginRegistry;

/// Logic under construction and the path-string cache of finished logic.
#[derive(Debug, Default)]
pub struct BuildState {
  pub(crate) heap: Vec<LogicId>,
  pub(crate) cache: HashMap<String, LogicId>,
}

/// Logic whose side-effect handler is currently executing.
#[derive(Debug, Default)]
pub struct RunState {
  pub(crate) heap: Vec<LogicId>,
}

/// Mount reference counts by path string.
#[derive(Debug, Default)]
pub struct MountState {
  pub(crate) counter: HashMap<String, usize>,
}

pub struct Context {
  options: Options,
  pub(crate) build: BuildState,
  pub(crate) run: RunState,
  pub(crate) mount: MountState,
  pub(crate) plugins: PluginRegistry,
  pub(crate) logics: HashMap<LogicId, Logic>,
  next_logic: u64,
  pub(crate) mounter: Rc<dyn MountLogic>,
}

impl Context {
  /// A context with default options and the reference-counting mount layer.
  pub fn new() -> Self {
    Self::with_options(Options::default())
  }

  pub fn with_options(options: Options) -> Self {
    Self {
      options,
      build: BuildState::default(),
      run: RunState::default(),
      mount: MountState::default(),
      plugins: PluginRegistry::default(),
      logics: HashMap::new(),
      next_logic: 1,
      mounter: Rc::new(RefCountMount),
    }
  }

  /// Replace the mount collaborator.
  pub fn with_mounter(mut self, mounter: impl MountLogic + 'static) -> Self {
    self.mounter = Rc::new(mounter);
    self
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn options_mut(&mut self) -> &mut Options {
    &mut self.options
  }

  pub fn plugins(&self) -> &PluginRegistry {
    &self.plugins
  }

  /// Logic currently under construction, innermost last.
  pub fn build_heap(&self) -> &[LogicId] {
    &self.build.heap
  }

  /// Logic whose handler is currently running, innermost last.
  pub fn run_heap(&self) -> &[LogicId] {
    &self.run.heap
  }

  /// Look up a finished logic by path string.
  pub fn cached(&self, path_string: &str) -> Option<LogicId> {
    self.build.cache.get(path_string).copied()
  }

  pub fn cache_len(&self) -> usize {
    self.build.cache.len()
  }

  /// Cached path strings and their logic, sorted by path string.
  pub fn cache_entries(&self) -> Vec<(&str, LogicId)> {
    let mut entries: Vec<_> = self.build.cache.iter().map(|(path, id)| (path.as_str(), *id)).collect();
    entries.sort();
    entries
  }

  pub fn mount_count(&self, path_string: &str) -> Option<usize> {
    self.mount.counter.get(path_string).copied()
  }

  /// Add `count` mounts to `path_string` and return the new total.
  ///
  /// Mount collaborators keep their counts through this and
  /// [`Context::release_mount`]; the builder reads them for listener mounts.
  pub fn add_mounts(&mut self, path_string: &str, count: usize) -> usize {
    let counter = self.mount.counter.entry(path_string.to_string()).or_insert(0);
    *counter += count;
    trace!(path = %path_string, count = *counter, "added mounts");
    *counter
  }

  /// Remove one mount from `path_string` and return what is left.
  ///
  /// A counter reaching zero is dropped. `None` means the path was not mounted.
  pub fn release_mount(&mut self, path_string: &str) -> Option<usize> {
    let counter = self.mount.counter.get_mut(path_string)?;
    *counter -= 1;
    let left = *counter;
    if left == 0 {
      self.mount.counter.remove(path_string);
    }
    trace!(path = %path_string, count = left, "released mount");
    Some(left)
  }

  pub fn logic(&self, id: LogicId) -> Option<&Logic> {
    self.logics.get(&id)
  }

  pub fn logic_mut(&mut self, id: LogicId) -> Option<&mut Logic> {
    self.logics.get_mut(&id)
  }

  /// Like [`Context::logic`], but a dead handle is an error.
  pub fn try_logic(&self, id: LogicId) -> Result<&Logic, BuildError> {
    self.logics.get(&id).ok_or(BuildError::UnknownLogic(id))
  }

  pub fn try_logic_mut(&mut self, id: LogicId) -> Result<&mut Logic, BuildError> {
    self.logics.get_mut(&id).ok_or(BuildError::UnknownLogic(id))
  }

  /// Run `f` with `logic` on top of the run heap.
  ///
  /// Listener layers wrap handler execution in this so that logic built from
  /// inside a handler is connected to (and mounted alongside) the running logic.
  ///
  /// A logic evicted while its handler ran is released once the scope ends,
  /// unless something still connects to it.
  pub fn run_in<T>(&mut self, logic: LogicId, f: impl FnOnce(&mut Self) -> T) -> T {
    self.run.heap.push(logic);
    trace!(logic = %logic, depth = self.run.heap.len(), "entered run scope");
    let out = f(self);
    let popped = self.run.heap.pop();
    debug_assert_eq!(popped, Some(logic), "run heap out of balance");
    if !self.is_cached(logic) {
      self.release_unreachable();
    }
    out
  }

  /// Whether `logic` is the cached logic for its own path.
  pub fn is_cached(&self, logic: LogicId) -> bool {
    self
      .logics
      .get(&logic)
      .is_some_and(|l| self.cached(l.path_string()) == Some(logic))
  }

  /// Run `f` with `logic` on top of the build heap.
  pub(crate) fn with_build_scope<T>(&mut self, logic: LogicId, f: impl FnOnce(&mut Self) -> T) -> T {
    self.build.heap.push(logic);
    trace!(logic = %logic, depth = self.build.heap.len(), "entered build scope");
    let out = f(self);
    let popped = self.build.heap.pop();
    debug_assert_eq!(popped, Some(logic), "build heap out of balance");
    out
  }

  pub(crate) fn allocate_logic(
    &mut self,
    key: Option<Key>,
    path: Path,
    props: Option<Props>,
    wrapper: Option<Wrapper>,
  ) -> LogicId {
    let id = LogicId(self.next_logic);
    self.next_logic += 1;
    self.logics.insert(id, Logic::blank(id, key, path, props, wrapper));
    id
  }

  /// Drop a path from the cache.
  ///
  /// The evicted logic stays readable while another logic is connected to it
  /// or it sits on a heap; everything no longer reachable is released. This is
  /// the mount layer's eviction primitive; the builder never calls it.
  pub fn evict(&mut self, path_string: &str) -> Option<LogicId> {
    let id = self.build.cache.remove(path_string)?;
    debug!(path = %path_string, logic = %id, "evicted logic");
    self.release_unreachable();
    Some(id)
  }

  // Keeps logic reachable from the cache or a heap through connections.
  fn release_unreachable(&mut self) {
    let mut live: HashSet<LogicId> = self
      .build
      .cache
      .values()
      .chain(&self.build.heap)
      .chain(&self.run.heap)
      .copied()
      .collect();
    let mut pending: Vec<LogicId> = live.iter().copied().collect();

    while let Some(id) = pending.pop() {
      let Some(logic) = self.logics.get(&id) else {
        continue;
      };
      for dependency in logic.connections.values() {
        if live.insert(*dependency) {
          pending.push(*dependency);
        }
      }
    }

    let before = self.logics.len();
    self.logics.retain(|id, _| live.contains(id));
    let released = before - self.logics.len();
    if released > 0 {
      trace!(released, "released unreachable logic");
    }
  }

  /// Empty the cache, the arena and the mount counters. Plugins stay active.
  pub fn clear_cache(&mut self) {
    debug!(cached = self.build.cache.len(), "clearing build cache");
    self.build.cache.clear();
    self.mount.counter.clear();
    self.logics.retain(|id, _| self.build.heap.contains(id));
  }

  /// Return to a freshly constructed state, keeping options and mount collaborator.
  pub fn reset(&mut self) {
    self.clear_activated_plugins();
    self.build = BuildState::default();
    self.run = RunState::default();
    self.mount = MountState::default();
    self.logics.clear();
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for Context {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Context")
      .field("options", &self.options)
      .field("build", &self.build)
      .field("run", &self.run)
      .field("mount", &self.mount)
      .field("plugins", &self.plugins.activated().len())
      .field("logics", &self.logics.len())
      .finish()
  }
}
