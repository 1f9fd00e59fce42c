//! Integration tests for the kiln-lib engine.

mod auto_connect_tests;
mod blueprint_tests;
mod build_tests;
mod common;
mod mount_tests;
