//! Error types for logic construction.

use thiserror::Error;

use crate::logic::LogicId;

/// Errors that can occur while building, connecting, or mounting logic.
///
/// Hooks and build steps return this type as well, so an error raised deep
/// inside a nested build reaches the outermost caller unchanged.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The input declares a key function but the props do not yield a key.
  #[error("must have key to build logic (input {input})")]
  MissingKey { input: String },

  /// The resolved path has no segments.
  #[error("resolved an empty path for input {input}")]
  EmptyPath { input: String },

  /// `get_built_logic` was called without any inputs.
  #[error("cannot build logic without inputs")]
  NoInputs,

  /// The requested path is already under construction further up the build heap.
  #[error("circular build detected: '{path}' is already being built")]
  CircularBuild { path: String },

  /// A handle no longer points at a live logic (never built, failed, or evicted).
  #[error("unknown logic: {0}")]
  UnknownLogic(LogicId),

  /// A plugin placed a step group relative to a group that is not registered.
  #[error("plugin '{plugin}' places step group '{group}' relative to unknown group '{anchor}'")]
  UnknownStepGroup {
    plugin: String,
    group: String,
    anchor: String,
  },

  /// Failure raised by a hook or build step.
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}
