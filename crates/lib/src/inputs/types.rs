//! Input types.
//!
//! This module defines the declarative units a logic is built from:
//! - [`Input`] - one input declaration with optional key, path, `extend` list and data
//! - [`Key`] - the instance key an input derives from props
//! - [`PathSpec`] - an explicit path, either static or computed

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Properties supplied by the caller at build/reuse time.
pub type Props = Value;

/// Derives the instance key from props.
pub type KeyFn = Rc<dyn Fn(&Props) -> Option<Key>>;

/// Computes path segments from the resolved key and the props.
pub type PathFn = Rc<dyn Fn(Option<&Key>, Option<&Props>) -> Vec<String>>;

static NEXT_INPUT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`Input`], used when synthesizing default paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputId(pub u64);

impl InputId {
  fn next() -> Self {
    InputId(NEXT_INPUT_ID.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for InputId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Instance key distinguishing several logics built from the same input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
  /// Convert a scalar JSON value into a key. `null`, arrays and objects yield `None`.
  pub fn from_value(value: &Value) -> Option<Key> {
    match value {
      Value::String(s) => Some(Key(s.clone())),
      Value::Number(n) => Some(Key(n.to_string())),
      Value::Bool(b) => Some(Key(b.to_string())),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Key {
  fn from(value: &str) -> Self {
    Key(value.to_string())
  }
}

impl From<String> for Key {
  fn from(value: String) -> Self {
    Key(value)
  }
}

impl From<i64> for Key {
  fn from(value: i64) -> Self {
    Key(value.to_string())
  }
}

impl From<u64> for Key {
  fn from(value: u64) -> Self {
    Key(value.to_string())
  }
}

/// An explicit path override.
#[derive(Clone)]
pub enum PathSpec {
  Static(Vec<String>),
  Computed(PathFn),
}

impl fmt::Debug for PathSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PathSpec::Static(segments) => f.debug_tuple("Static").field(segments).finish(),
      PathSpec::Computed(_) => f.write_str("Computed(..)"),
    }
  }
}

/// A declarative input.
///
/// Inputs are immutable once shared; the engine only reads them. They are
/// deliberately not `Clone`: the [`InputId`] is part of an input's identity.
pub struct Input {
  id: InputId,
  name: Option<String>,
  key: Option<KeyFn>,
  path: Option<PathSpec>,
  extend: Vec<Rc<Input>>,
  data: Map<String, Value>,
}

impl Input {
  pub fn new() -> Self {
    Self {
      id: InputId::next(),
      name: None,
      key: None,
      path: None,
      extend: Vec::new(),
      data: Map::new(),
    }
  }

  /// A new input carrying a name for logs and error messages.
  pub fn named(name: &str) -> Self {
    let mut input = Self::new();
    input.name = Some(name.to_string());
    input
  }

  pub fn with_key(mut self, key: impl Fn(&Props) -> Option<Key> + 'static) -> Self {
    self.key = Some(Rc::new(key));
    self
  }

  /// Key the input by the scalar value of one prop.
  pub fn with_key_prop(self, prop: &str) -> Self {
    let prop = prop.to_string();
    self.with_key(move |props| props.get(&prop).and_then(Key::from_value))
  }

  pub fn with_path<I, S>(mut self, segments: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.path = Some(PathSpec::Static(segments.into_iter().map(Into::into).collect()));
    self
  }

  pub fn with_path_fn(mut self, path: impl Fn(Option<&Key>, Option<&Props>) -> Vec<String> + 'static) -> Self {
    self.path = Some(PathSpec::Computed(Rc::new(path)));
    self
  }

  pub fn with_extend(mut self, input: Rc<Input>) -> Self {
    self.extend.push(input);
    self
  }

  pub fn with_data(mut self, key: &str, value: Value) -> Self {
    self.data.insert(key.to_string(), value);
    self
  }

  pub fn id(&self) -> InputId {
    self.id
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn key_fn(&self) -> Option<&KeyFn> {
    self.key.as_ref()
  }

  pub fn has_key(&self) -> bool {
    self.key.is_some()
  }

  pub fn path(&self) -> Option<&PathSpec> {
    self.path.as_ref()
  }

  pub fn extend(&self) -> &[Rc<Input>] {
    &self.extend
  }

  pub fn data(&self) -> &Map<String, Value> {
    &self.data
  }

  /// Human-readable label: the name if any, otherwise `#<id>`.
  pub fn label(&self) -> String {
    match &self.name {
      Some(name) => name.clone(),
      None => format!("#{}", self.id),
    }
  }
}

impl Default for Input {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Input {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Input")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("key", &self.key.as_ref().map(|_| ".."))
      .field("path", &self.path)
      .field("extend", &self.extend)
      .field("data", &self.data)
      .finish()
  }
}
