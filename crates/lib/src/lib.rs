//! kiln-lib: the logic build engine behind kiln
//!
//! This crate turns declarative inputs into cached, connected logic:
//! - `Context`: explicit engine state (build cache, build/run heaps, mount counters, plugins)
//! - `Input`: an immutable declaration that resolves to a key and a path
//! - `Logic`: the built object, cached by path string and connected to its dependencies
//! - `Plugin`: lifecycle hooks and ordered build steps
//! - `MountLogic`: the reference-counting mount collaborator
//! - `Blueprint`: JSON declarations compiled into inputs

pub mod blueprint;
pub mod build;
pub mod connect;
pub mod consts;
pub mod context;
pub mod error;
pub mod graph;
pub mod inputs;
pub mod logic;
pub mod mount;
pub mod options;
pub mod path;
pub mod plugin;
pub mod util;

pub use blueprint::{Blueprint, BlueprintError, CompiledBlueprint, blueprint_plugin};
pub use context::Context;
pub use error::BuildError;
pub use graph::{ConnectionGraph, GraphError};
pub use inputs::{Input, Key, Props};
pub use logic::{Logic, LogicId, Wrapper};
pub use mount::{MountLogic, RefCountMount, Unmount};
pub use options::Options;
pub use path::Path;
pub use plugin::{HookCall, Plugin, StepPlacement};
