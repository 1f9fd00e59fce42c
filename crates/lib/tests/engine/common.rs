//! Shared helpers for engine integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use kiln_lib::{BuildError, Context, Input, LogicId, MountLogic, Plugin};

/// An unnamed input with a static path.
pub fn input(segments: &[&str]) -> Rc<Input> {
  Rc::new(Input::new().with_path(segments.iter().copied()))
}

/// Records mount requests instead of counting them.
#[derive(Debug, Default, Clone)]
pub struct RecordingMount {
  pub mounts: Rc<RefCell<Vec<(String, Option<usize>)>>>,
  pub unmounts: Rc<RefCell<Vec<String>>>,
}

impl MountLogic for RecordingMount {
  fn mount_logic(&self, ctx: &mut Context, logic: LogicId, count: Option<usize>) -> Result<(), BuildError> {
    let path = ctx.try_logic(logic)?.path_string().to_string();
    self.mounts.borrow_mut().push((path, count));
    Ok(())
  }

  fn unmount_logic(&self, ctx: &mut Context, logic: LogicId) -> Result<(), BuildError> {
    let path = ctx.try_logic(logic)?.path_string().to_string();
    self.unmounts.borrow_mut().push(path);
    Ok(())
  }
}

/// Activate a plugin that logs `mount:<path>` and `unmount:<path>` events.
pub fn mount_log(ctx: &mut Context) -> Rc<RefCell<Vec<String>>> {
  let log = Rc::new(RefCell::new(Vec::new()));
  let mounted = log.clone();
  let unmounted = log.clone();
  ctx
    .activate_plugin(
      Plugin::new("mount-log")
        .on_mounted_path(move |_, path, _| {
          mounted.borrow_mut().push(format!("mount:{path}"));
          Ok(())
        })
        .on_unmounted_path(move |_, path, _| {
          unmounted.borrow_mut().push(format!("unmount:{path}"));
          Ok(())
        }),
    )
    .unwrap();
  log
}

/// A plugin whose `deps` step builds every input listed under the `deps` data key.
pub fn deps_plugin(deps: Vec<Rc<Input>>, in_listener: bool) -> Plugin {
  Plugin::new("deps").with_build_step("deps", move |ctx, _, input| {
    if input.data().contains_key("deps") {
      for dep in &deps {
        ctx.get_built_logic(std::slice::from_ref(dep), None, None, in_listener)?;
      }
    }
    Ok(())
  })
}

pub const SHOP: &str = r#"{
  "logics": {
    "item": { "path": ["item"], "key": "id", "connect": ["cart"], "fields": { "kind": "item" } },
    "cart": { "path": ["cart"], "fields": { "items": [] } },
    "checkout": { "path": ["checkout"], "connect": ["cart"] }
  }
}"#;
