use anyhow::Result;
use serde_json::json;

use kiln_lib::Options;
use kiln_lib::consts::AUTO_CONNECT_ENV;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let options = Options::from_env();

  if output.is_json() {
    return print_json(&json!({
      "version": env!("CARGO_PKG_VERSION"),
      "options": options,
    }));
  }

  println!("kiln {}", env!("CARGO_PKG_VERSION"));
  println!();
  println!("Options:");
  print_stat("Auto-connect", &options.auto_connect.to_string());
  print_stat("Default path", &options.default_path.join("."));
  print_stat("Environment", AUTO_CONNECT_ENV);
  Ok(())
}
