//! Blueprint document types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::options::Options;

/// A JSON document declaring named logics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
  /// Engine options to build the blueprint with.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Options>,

  #[serde(default)]
  pub logics: BTreeMap<String, LogicDecl>,
}

/// One declared logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogicDecl {
  /// Explicit path; a synthesized one is used when absent.
  pub path: Option<Vec<String>>,

  /// Prop whose value keys instances of this logic. Appended to the path.
  pub key: Option<String>,

  /// Logics built (and connected) whenever this one is built.
  pub connect: Vec<String>,

  /// Fields merged onto the logic.
  pub fields: Map<String, Value>,

  /// Declarations applied after this one.
  pub extend: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BlueprintError {
  #[error("failed to read blueprint {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid blueprint: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("logic '{name}' referenced by '{referenced_by}' is not declared")]
  UnknownLogic { name: String, referenced_by: String },

  #[error("logic '{name}' is not declared")]
  Undeclared { name: String },

  #[error("extend cycle: {chain}")]
  ExtendCycle { chain: String },
}
