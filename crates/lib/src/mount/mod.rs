//! Mounting and unmounting.
//!
//! The builder only decides *when* a logic must be mounted; the reference
//! counting itself lives behind [`MountLogic`]. [`RefCountMount`] is the
//! collaborator every new [`Context`] starts with:
//!
//! - mounting adds to the counter of every path the logic is connected to,
//!   dependencies first and the logic's own path last
//! - unmounting walks the same paths in reverse and decrements them
//! - a path whose counter drops to zero is evicted from the cache
//!
//! Eviction only removes the cache entry. A logic other logics are still
//! connected to stays readable, so mounting one of them later works even if
//! the shared dependency was mounted and unmounted on its own in between.

use std::future::Future;

use tracing::{debug, warn};

use crate::context::Context;
use crate::error::BuildError;
use crate::logic::LogicId;
use crate::plugin::HookCall;

/// The mount/unmount collaborator consumed by the builder.
pub trait MountLogic {
  /// Mount `logic` and everything it is connected to, `count` times (once when `None`).
  fn mount_logic(&self, ctx: &mut Context, logic: LogicId, count: Option<usize>) -> Result<(), BuildError>;

  /// Undo one mount of `logic`.
  fn unmount_logic(&self, ctx: &mut Context, logic: LogicId) -> Result<(), BuildError>;
}

/// Reference counting by path string, evicting at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefCountMount;

impl MountLogic for RefCountMount {
  fn mount_logic(&self, ctx: &mut Context, logic: LogicId, count: Option<usize>) -> Result<(), BuildError> {
    let count = count.unwrap_or(1).max(1);

    for (path, id) in mount_sequence(ctx, logic)? {
      if ctx.add_mounts(&path, count) == count {
        debug!(path = %path, "mounted path");
        ctx.run_plugins(HookCall::MountedPath(&path, id))?;
      }
    }

    Ok(())
  }

  fn unmount_logic(&self, ctx: &mut Context, logic: LogicId) -> Result<(), BuildError> {
    for (path, id) in mount_sequence(ctx, logic)?.into_iter().rev() {
      match ctx.release_mount(&path) {
        None => warn!(path = %path, "unmounting a path that is not mounted"),
        Some(0) => {
          debug!(path = %path, "unmounted path");
          ctx.run_plugins(HookCall::UnmountedPath(&path, id))?;
          // A rebuilt logic under the same path is not ours to evict.
          if ctx.cached(&path) == Some(id) {
            ctx.evict(&path);
          }
        }
        Some(_) => {}
      }
    }

    Ok(())
  }
}

// Connected paths with the logic's own path moved to the end.
fn mount_sequence(ctx: &Context, logic: LogicId) -> Result<Vec<(String, LogicId)>, BuildError> {
  let logic = ctx.try_logic(logic)?;
  let own = logic.path_string();

  let mut sequence: Vec<(String, LogicId)> = Vec::with_capacity(logic.connections().len());
  for (path, id) in logic.connections() {
    if path.as_str() == own {
      continue;
    }
    if ctx.cached(path) != Some(*id) {
      warn!(parent = %logic.id(), path = %path, logic = %id, "connection points at logic that is no longer cached");
    }
    sequence.push((path.clone(), *id));
  }
  sequence.push((own.to_string(), logic.id()));
  Ok(sequence)
}

/// Token returned by [`Context::mount`]; hand it back to undo the mount.
#[derive(Debug)]
#[must_use = "the logic stays mounted until `unmount` is called"]
pub struct Unmount {
  logic: LogicId,
}

impl Unmount {
  pub fn logic(&self) -> LogicId {
    self.logic
  }

  pub fn unmount(self, ctx: &mut Context) -> Result<(), BuildError> {
    ctx.unmount_logic(self.logic)
  }
}

impl Context {
  /// Delegate to the mount collaborator.
  pub fn mount_logic(&mut self, logic: LogicId, count: Option<usize>) -> Result<(), BuildError> {
    let mounter = self.mounter.clone();
    mounter.mount_logic(self, logic, count)
  }

  /// Delegate to the mount collaborator.
  pub fn unmount_logic(&mut self, logic: LogicId) -> Result<(), BuildError> {
    let mounter = self.mounter.clone();
    mounter.unmount_logic(self, logic)
  }

  /// Mount `logic` and return the token that unmounts it.
  pub fn mount(&mut self, logic: LogicId) -> Result<Unmount, BuildError> {
    self.mount_logic(logic, None)?;
    Ok(Unmount { logic })
  }

  /// Mount `logic`, run `f`, unmount, and return what `f` returned.
  pub fn mount_with<R>(&mut self, logic: LogicId, f: impl FnOnce(&mut Context, LogicId) -> R) -> Result<R, BuildError> {
    self.mount_logic(logic, None)?;
    let response = f(self, logic);
    self.unmount_logic(logic)?;
    Ok(response)
  }

  /// Mount `logic` for as long as the future returned by `f` is pending.
  ///
  /// The unmount runs after the future settles and before its value is returned.
  pub async fn mount_async<F, Fut, R>(&mut self, logic: LogicId, f: F) -> Result<R, BuildError>
  where
    F: FnOnce(LogicId) -> Fut,
    Fut: Future<Output = R>,
  {
    self.mount_logic(logic, None)?;
    let value = f(logic).await;
    self.unmount_logic(logic)?;
    Ok(value)
  }
}
