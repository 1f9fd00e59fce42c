//! The built logic object and its handle.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::inputs::{Key, Props};
use crate::path::Path;

/// Stable handle to a logic owned by a [`Context`](crate::context::Context).
///
/// Two handles are equal exactly when they refer to the same built object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicId(pub(crate) u64);

impl fmt::Display for LogicId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "logic#{}", self.0)
  }
}

/// Identity tag of the module that produced a logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wrapper(pub String);

impl From<&str> for Wrapper {
  fn from(value: &str) -> Self {
    Wrapper(value.to_string())
  }
}

/// A built logic.
///
/// Identity fields are fixed at construction. `props` is refreshed on every
/// cache hit, `fields` is written by plugin defaults and build steps, and
/// `connections` only grows while the logic is cached.
#[derive(Debug, Clone, Serialize)]
pub struct Logic {
  id: LogicId,
  key: Option<Key>,
  path: Path,
  path_string: String,
  pub(crate) props: Option<Props>,
  wrapper: Option<Wrapper>,
  pub(crate) connections: IndexMap<String, LogicId>,
  pub fields: Map<String, Value>,
}

impl Logic {
  pub(crate) fn blank(id: LogicId, key: Option<Key>, path: Path, props: Option<Props>, wrapper: Option<Wrapper>) -> Self {
    Self {
      id,
      key,
      path_string: path.to_path_string(),
      path,
      props,
      wrapper,
      connections: IndexMap::new(),
      fields: Map::new(),
    }
  }

  pub fn id(&self) -> LogicId {
    self.id
  }

  pub fn key(&self) -> Option<&Key> {
    self.key.as_ref()
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn path_string(&self) -> &str {
    &self.path_string
  }

  pub fn props(&self) -> Option<&Props> {
    self.props.as_ref()
  }

  pub fn wrapper(&self) -> Option<&Wrapper> {
    self.wrapper.as_ref()
  }

  /// Logics this one keeps mounted, keyed by path string, in insertion order.
  pub fn connections(&self) -> &IndexMap<String, LogicId> {
    &self.connections
  }

  pub fn field(&self, name: &str) -> Option<&Value> {
    self.fields.get(name)
  }

  pub fn set_field(&mut self, name: &str, value: Value) {
    self.fields.insert(name.to_string(), value);
  }
}
