//! Engine configuration.
//!
//! Options are plain data: they can be built in code, deserialized from a
//! blueprint's `options` table, or read from the environment.

use serde::{Deserialize, Serialize};

use crate::consts::{AUTO_CONNECT_ENV, DEFAULT_PATH_PREFIX};

/// Configuration consulted by the builder on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
  /// Register connections automatically when logic is built inside another
  /// logic's build or listener.
  pub auto_connect: bool,

  /// Leading segments of paths synthesized for inputs without an explicit path.
  pub default_path: Vec<String>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      auto_connect: true,
      default_path: DEFAULT_PATH_PREFIX.iter().map(|s| s.to_string()).collect(),
    }
  }
}

impl Options {
  /// Defaults overridden by `KILN_AUTO_CONNECT` when it is set.
  pub fn from_env() -> Self {
    let mut options = Self::default();
    if let Ok(value) = std::env::var(AUTO_CONNECT_ENV) {
      options.auto_connect = parse_flag(&value);
    }
    options
  }

  pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
    self.auto_connect = auto_connect;
    self
  }
}

fn parse_flag(value: &str) -> bool {
  !matches!(
    value.trim().to_ascii_lowercase().as_str(),
    "0" | "false" | "no" | "off"
  )
}
