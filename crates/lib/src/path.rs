//! Path and key resolution.
//!
//! Every logic is identified by a non-empty [`Path`]. Its joined form is the
//! cache key and the key under which other logics connect to it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::PATH_SEPARATOR;
use crate::error::BuildError;
use crate::inputs::{Input, Key, PathSpec, Props};
use crate::options::Options;

/// Ordered identity segments of a logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
  pub fn segments(&self) -> &[String] {
    &self.0
  }

  /// Segments joined with [`PATH_SEPARATOR`].
  pub fn to_path_string(&self) -> String {
    self.0.join(PATH_SEPARATOR)
  }
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_path_string())
  }
}

/// Evaluate the input's key function against the props.
///
/// Inputs without a key function have no key. An input with one must produce a
/// key; absent props count as "no key".
pub fn resolve_key(input: &Input, props: Option<&Props>) -> Result<Option<Key>, BuildError> {
  let Some(key_fn) = input.key_fn() else {
    return Ok(None);
  };

  match props.and_then(|props| key_fn(props)) {
    Some(key) => Ok(Some(key)),
    None => Err(BuildError::MissingKey { input: input.label() }),
  }
}

/// Resolve the path for an input.
///
/// An explicit path is used as given. Otherwise the path is synthesized from
/// the configured prefix, the input's id and the key, so it is stable for the
/// lifetime of the input.
pub fn path_for_input(
  input: &Input,
  key: Option<&Key>,
  props: Option<&Props>,
  options: &Options,
) -> Result<Path, BuildError> {
  let segments = match input.path() {
    Some(PathSpec::Static(segments)) => segments.clone(),
    Some(PathSpec::Computed(path_fn)) => path_fn(key, props),
    None => {
      let mut segments = options.default_path.clone();
      segments.push(input.id().to_string());
      if let Some(key) = key {
        segments.push(key.to_string());
      }
      segments
    }
  };

  if segments.is_empty() {
    return Err(BuildError::EmptyPath { input: input.label() });
  }

  Ok(Path(segments))
}
