//! Build cache and path resolution through the public API.

use std::rc::Rc;

use kiln_lib::{BuildError, Context, Input, Key, Options};
use serde_json::json;

use super::common::input;

#[test]
fn keyed_input_resolves_path_from_props() {
  let mut ctx = Context::new();
  let item = Rc::new(
    Input::named("item")
      .with_key(|props| props.get("id").and_then(Key::from_value))
      .with_path_fn(|_, props| {
        let id = props.and_then(|p| p.get("id")).map(|v| v.to_string()).unwrap_or_default();
        vec!["item".to_string(), id]
      }),
  );

  let first = ctx.build(&[item.clone()], Some(json!({ "id": 7 }))).unwrap();
  let second = ctx.build(&[item], Some(json!({ "id": 7, "extra": true }))).unwrap();

  assert_eq!(first, second);
  let logic = ctx.logic(first).unwrap();
  assert_eq!(logic.path_string(), "item.7");
  assert_eq!(logic.key(), Some(&Key::from("7")));
  assert_eq!(logic.props().and_then(|p| p.get("extra")), Some(&json!(true)));
  assert_eq!(ctx.cache_len(), 1);
}

#[test]
fn unpathed_inputs_get_distinct_default_paths() {
  let mut ctx = Context::new();
  let a = ctx.build(&[Rc::new(Input::new())], None).unwrap();
  let b = ctx.build(&[Rc::new(Input::new())], None).unwrap();

  assert_ne!(a, b);
  let path = ctx.logic(a).unwrap().path().segments().to_vec();
  assert_eq!(&path[..2], ["kiln", "inline"]);
}

#[test]
fn default_prefix_follows_options() {
  let options = Options {
    default_path: vec!["scratch".into()],
    ..Options::default()
  };
  let mut ctx = Context::with_options(options);
  let logic = ctx.build(&[Rc::new(Input::new())], None).unwrap();

  assert!(ctx.logic(logic).unwrap().path_string().starts_with("scratch."));
}

#[test]
fn keyed_input_without_key_fails() {
  let mut ctx = Context::new();
  let keyed = Rc::new(Input::named("user").with_key_prop("id"));

  let err = ctx.build(&[keyed], None).unwrap_err();

  assert!(matches!(err, BuildError::MissingKey { ref input } if input == "user"));
  assert_eq!(ctx.cache_len(), 0);
}

#[test]
fn clear_cache_forces_reconstruction() {
  let mut ctx = Context::new();
  let inputs = [input(&["a"])];
  let first = ctx.build(&inputs, None).unwrap();

  ctx.clear_cache();
  let second = ctx.build(&inputs, None).unwrap();

  assert_ne!(first, second);
  assert!(ctx.logic(first).is_none());
}
