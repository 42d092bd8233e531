//! Textspace - multi-user text world core
//!
//! This crate re-exports all layers of the Textspace system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: textspace_runtime     Demo host: REPL, config, in-memory world
//! Layer 2: textspace_engine      Scheduler, event dispatcher, engine facade
//! Layer 1: textspace_commands    Registry, resolver, completion, processor
//!          textspace_script      DSL lexer, parser, interpreter
//! Layer 0: textspace_foundation  Error taxonomy
//! ```

pub use textspace_commands as commands;
pub use textspace_engine as engine;
pub use textspace_foundation as foundation;
pub use textspace_runtime as runtime;
pub use textspace_script as script;
