//! Blueprints compiled and built end to end.

use std::rc::Rc;

use kiln_lib::{Blueprint, BlueprintError, ConnectionGraph, Context, blueprint_plugin};
use serde_json::json;
use tempfile::TempDir;

use super::common::SHOP;

fn shop() -> (Context, Rc<kiln_lib::CompiledBlueprint>) {
  let compiled = Rc::new(Blueprint::from_json(SHOP).unwrap().compile().unwrap());
  let mut ctx = Context::with_options(compiled.options().clone());
  ctx.activate_plugin(blueprint_plugin(compiled.clone())).unwrap();
  (ctx, compiled)
}

#[test]
fn keyed_declaration_is_cached_per_key() {
  let (mut ctx, compiled) = shop();

  let seven = compiled.build(&mut ctx, "item", Some(json!({ "id": 7 }))).unwrap();
  let again = compiled
    .build(&mut ctx, "item", Some(json!({ "id": 7, "extra": true })))
    .unwrap();
  let eight = compiled.build(&mut ctx, "item", Some(json!({ "id": 8 }))).unwrap();

  assert_eq!(seven, again);
  assert_ne!(seven, eight);
  assert_eq!(ctx.logic(seven).unwrap().path_string(), "item.7");
  assert_eq!(
    ctx.logic(seven).unwrap().props().and_then(|p| p.get("extra")),
    Some(&json!(true))
  );
}

#[test]
fn shared_dependency_is_built_once() {
  let (mut ctx, compiled) = shop();

  compiled.build(&mut ctx, "item", Some(json!({ "id": 1 }))).unwrap();
  compiled.build(&mut ctx, "checkout", None).unwrap();

  let graph = ConnectionGraph::from_context(&ctx);
  assert_eq!(graph.dependents("cart"), ["checkout", "item.1"]);
  assert_eq!(graph.levels().unwrap()[0], ["cart"]);
}

#[test]
fn fields_land_on_the_logic() {
  let (mut ctx, compiled) = shop();

  let cart = compiled.build(&mut ctx, "cart", None).unwrap();

  assert_eq!(ctx.logic(cart).unwrap().field("items"), Some(&json!([])));
}

#[test]
fn blueprint_loads_from_disk() {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("shop.json");
  std::fs::write(&path, SHOP).unwrap();

  let blueprint = Blueprint::from_file(&path).unwrap();

  assert_eq!(blueprint.logics.len(), 3);
}

#[test]
fn malformed_blueprint_is_a_parse_error() {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("broken.json");
  std::fs::write(&path, "{ logics: ").unwrap();

  assert!(matches!(Blueprint::from_file(&path), Err(BlueprintError::Parse(_))));
}
