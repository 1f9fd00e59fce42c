//! Input specs and their identity.
//!
//! An input is the declarative unit a logic is built from. A build request
//! carries an ordered stack of inputs; the first one decides the logic's key
//! and path, and every input (plus its `extend` entries) is fed through the
//! build steps in order.

mod types;

pub use types::*;
