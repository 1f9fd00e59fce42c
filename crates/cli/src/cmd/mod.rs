mod build;
mod graph;
mod info;

pub use build::cmd_build;
pub use graph::cmd_graph;
pub use info::cmd_info;

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context as _, Result, bail};
use serde_json::Value;

use kiln_lib::consts::AUTO_CONNECT_ENV;
use kiln_lib::{Blueprint, CompiledBlueprint, Context, Options, Props, blueprint_plugin};

/// Load and compile a blueprint, returning a context with the blueprint plugin active.
///
/// `KILN_AUTO_CONNECT` overrides the blueprint's own `auto_connect` setting.
fn load_blueprint(path: &Path) -> Result<(Context, Rc<CompiledBlueprint>)> {
  let blueprint = Blueprint::from_file(path)?;
  let compiled = Rc::new(
    blueprint
      .compile()
      .with_context(|| format!("Failed to compile blueprint {}", path.display()))?,
  );

  let mut options = compiled.options().clone();
  if std::env::var_os(AUTO_CONNECT_ENV).is_some() {
    options.auto_connect = Options::from_env().auto_connect;
  }

  let mut ctx = Context::with_options(options);
  ctx.activate_plugin(blueprint_plugin(compiled.clone()))?;
  Ok((ctx, compiled))
}

fn parse_props(props: Option<&str>) -> Result<Option<Props>> {
  let Some(raw) = props else {
    return Ok(None);
  };

  let value: Value = serde_json::from_str(raw).context("Failed to parse --props as JSON")?;
  if !value.is_object() {
    bail!("--props must be a JSON object");
  }
  Ok(Some(value))
}
