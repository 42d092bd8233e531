//! Integration tests for the textspace_commands crate.
//!
//! Tests for the command-processing path:
//! - Registry registration and lookup
//! - Resolution priority and permissions
//! - Completion of command words and arguments
//! - Properties over generated registries

mod completion;
mod properties;
mod registry;
mod resolution;
