//! Automatic connection of logic built inside builds and listeners.

use std::rc::Rc;

use kiln_lib::{Context, Input, Options};
use serde_json::json;

use super::common::{RecordingMount, deps_plugin, input};

fn with_deps(path: &str) -> Rc<Input> {
  Rc::new(Input::new().with_path([path]).with_data("deps", json!(true)))
}

mod during_build {
  use super::*;

  #[test]
  fn nested_builds_connect_to_the_parent() {
    let mut ctx = Context::new();
    ctx.activate_plugin(deps_plugin(vec![input(&["dep"])], true)).unwrap();

    let parent = ctx.build(&[with_deps("parent")], None).unwrap();

    let dep = ctx.cached("dep").unwrap();
    assert_eq!(ctx.logic(parent).unwrap().connections().get("dep"), Some(&dep));
  }

  #[test]
  fn listener_flag_does_not_matter_during_build() {
    let recorder = RecordingMount::default();
    let mut ctx = Context::new().with_mounter(recorder.clone());
    ctx.activate_plugin(deps_plugin(vec![input(&["dep"])], false)).unwrap();

    let parent = ctx.build(&[with_deps("parent")], None).unwrap();

    assert!(ctx.is_connected(parent, "dep").unwrap());
    assert!(recorder.mounts.borrow().is_empty());
  }

  #[test]
  fn build_heap_takes_precedence_over_run_heap() {
    let recorder = RecordingMount::default();
    let mut ctx = Context::new().with_mounter(recorder.clone());
    ctx.activate_plugin(deps_plugin(vec![input(&["dep"])], true)).unwrap();
    let running = ctx.build(&[input(&["running"])], None).unwrap();

    let parent = ctx.run_in(running, |ctx| ctx.build(&[with_deps("parent")], None)).unwrap();

    assert!(ctx.is_connected(parent, "dep").unwrap());
    // the running logic inherits dep through parent
    assert!(ctx.is_connected(running, "parent").unwrap());
    assert!(ctx.is_connected(running, "dep").unwrap());
    // only the outer build is mounted
    assert_eq!(*recorder.mounts.borrow(), [("parent".to_string(), None)]);
  }
}

mod in_listener {
  use super::*;

  #[test]
  fn connects_and_mounts_with_the_running_count() {
    let recorder = RecordingMount::default();
    let mut ctx = Context::new().with_mounter(recorder.clone());
    let running = ctx.build(&[input(&["running"])], None).unwrap();
    ctx.add_mounts("running", 2);

    let child = ctx.run_in(running, |ctx| ctx.build(&[input(&["child"])], None)).unwrap();

    assert_eq!(ctx.logic(running).unwrap().connections().get("child"), Some(&child));
    assert_eq!(*recorder.mounts.borrow(), [("child".to_string(), Some(2))]);
  }

  #[test]
  fn already_connected_logic_is_not_mounted_again() {
    let recorder = RecordingMount::default();
    let mut ctx = Context::new().with_mounter(recorder.clone());
    let running = ctx.build(&[input(&["running"])], None).unwrap();
    let child = input(&["child"]);

    ctx
      .run_in(running, |ctx| {
        ctx.build(&[child.clone()], None)?;
        ctx.build(&[child.clone()], None)
      })
      .unwrap();

    assert_eq!(recorder.mounts.borrow().len(), 1);
  }

  #[test]
  fn disabled_listener_flag_skips_connection_and_mount() {
    let recorder = RecordingMount::default();
    let mut ctx = Context::new().with_mounter(recorder.clone());
    let running = ctx.build(&[input(&["running"])], None).unwrap();

    ctx
      .run_in(running, |ctx| ctx.get_built_logic(&[input(&["child"])], None, None, false))
      .unwrap();

    assert!(!ctx.is_connected(running, "child").unwrap());
    assert!(recorder.mounts.borrow().is_empty());
  }

  #[test]
  fn handler_that_unmounted_its_own_logic_builds_unconnected() {
    let mut ctx = Context::new();
    let running = ctx.build(&[input(&["running"])], None).unwrap();
    let token = ctx.mount(running).unwrap();

    let child = ctx
      .run_in(running, |ctx| {
        token.unmount(ctx)?;
        ctx.build(&[input(&["child"])], None)
      })
      .unwrap();

    assert_eq!(ctx.cached("child"), Some(child));
    assert_eq!(ctx.mount_count("child"), None);
    assert_eq!(ctx.cached("running"), None);
    assert!(ctx.logic(running).is_none());
  }

  #[test]
  fn real_mount_layer_keeps_child_alive_with_the_running_logic() {
    let mut ctx = Context::new();
    let running = ctx.build(&[input(&["running"])], None).unwrap();
    let token = ctx.mount(running).unwrap();

    ctx.run_in(running, |ctx| ctx.build(&[input(&["child"])], None)).unwrap();
    assert_eq!(ctx.mount_count("child"), Some(1));

    token.unmount(&mut ctx).unwrap();
    assert_eq!(ctx.cache_len(), 0);
  }
}

mod disabled {
  use super::*;

  #[test]
  fn option_off_suppresses_all_connections() {
    let recorder = RecordingMount::default();
    let mut ctx = Context::with_options(Options::default().with_auto_connect(false)).with_mounter(recorder.clone());
    ctx.activate_plugin(deps_plugin(vec![input(&["dep"])], true)).unwrap();

    let parent = ctx.build(&[with_deps("parent")], None).unwrap();
    let running = ctx.build(&[input(&["running"])], None).unwrap();
    ctx.run_in(running, |ctx| ctx.build(&[input(&["child"])], None)).unwrap();

    assert!(!ctx.is_connected(parent, "dep").unwrap());
    assert!(!ctx.is_connected(running, "child").unwrap());
    assert!(recorder.mounts.borrow().is_empty());
  }

  #[test]
  fn option_can_be_flipped_on_a_live_context() {
    let mut ctx = Context::new();
    ctx.options_mut().auto_connect = false;
    let running = ctx.build(&[input(&["running"])], None).unwrap();

    ctx.run_in(running, |ctx| ctx.build(&[input(&["child"])], None)).unwrap();

    assert!(!ctx.is_connected(running, "child").unwrap());
  }
}
