//! Scoped mounting through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use kiln_lib::{ConnectionGraph, Context};

use super::common::{input, mount_log};

#[test]
fn mount_with_returns_the_value_after_unmount() {
  let mut ctx = Context::new();
  let log = mount_log(&mut ctx);
  let logic = ctx.build(&[input(&["task"])], None).unwrap();

  let inner = log.clone();
  let value = ctx
    .mount_with(logic, move |_, _| {
      inner.borrow_mut().push("callback".to_string());
      42
    })
    .unwrap();

  assert_eq!(value, 42);
  assert_eq!(*log.borrow(), ["mount:task", "callback", "unmount:task"]);
}

#[tokio::test]
async fn mount_async_unmounts_after_the_future_settles() {
  let mut ctx = Context::new();
  let log = mount_log(&mut ctx);
  let logic = ctx.build(&[input(&["task"])], None).unwrap();

  let inner = log.clone();
  let value = ctx
    .mount_async(logic, move |_| async move {
      inner.borrow_mut().push("pending".to_string());
      tokio::task::yield_now().await;
      inner.borrow_mut().push("settled".to_string());
      "done"
    })
    .await
    .unwrap();

  assert_eq!(value, "done");
  assert_eq!(*log.borrow(), ["mount:task", "pending", "settled", "unmount:task"]);
  assert_eq!(ctx.cached("task"), None);
}

#[test]
fn mount_follows_connection_order() {
  let mut ctx = Context::new();
  let log = mount_log(&mut ctx);
  let app = ctx.build(&[input(&["app"])], None).unwrap();
  let store = ctx.build(&[input(&["store"])], None).unwrap();
  let api = ctx.build(&[input(&["api"])], None).unwrap();
  ctx.add_connection(store, api).unwrap();
  ctx.add_connection(app, store).unwrap();

  let order = ConnectionGraph::from_context(&ctx).mount_order().unwrap();
  assert_eq!(order, ["api", "store", "app"]);

  let token = ctx.mount(app).unwrap();
  assert_eq!(*log.borrow(), ["mount:store", "mount:api", "mount:app"]);

  log.borrow_mut().clear();
  token.unmount(&mut ctx).unwrap();
  assert_eq!(*log.borrow(), ["unmount:app", "unmount:api", "unmount:store"]);
}

#[test]
fn hooks_may_build_while_mounting() {
  let mut ctx = Context::new();
  let built = Rc::new(RefCell::new(None));
  let slot = built.clone();
  ctx
    .activate_plugin(kiln_lib::Plugin::new("late").on_mounted_path(move |ctx, path, _| {
      if path == "app" {
        *slot.borrow_mut() = Some(ctx.build(&[input(&["late"])], None)?);
      }
      Ok(())
    }))
    .unwrap();
  let app = ctx.build(&[input(&["app"])], None).unwrap();

  let _token = ctx.mount(app).unwrap();

  assert!(built.borrow().is_some());
  assert_eq!(ctx.cached("late"), *built.borrow());
}
