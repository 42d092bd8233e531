//! Command layer for a multi-user text environment.
//!
//! Turns player input like "t alice hi" or "give lamp to bob" into a resolved
//! command plus arguments, and offers context-aware completion while the
//! player is still typing.
//!
//! # Architecture
//!
//! ```text
//! "t alice hi"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   TOKENIZER     │  → ["t", "alice", "hi"]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   RESOLVER      │  → single-letter alias, exact name, then unique prefix
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   PROCESSOR     │  → arity check, handler dispatch
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`command`] - Command definitions and argument types
//! - [`registry`] - Name/alias table with conflict detection
//! - [`resolver`] - Token to command resolution
//! - [`tokenizer`] - Raw input to tokens
//! - [`scope`] - Per-caller world snapshot
//! - [`argument`] - Argument matching against the snapshot
//! - [`completion`] - Tab completion
//! - [`processor`] - Input line to handler output
//! - [`stdlib`] - Standard command catalog

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod argument;
pub mod command;
pub mod completion;
pub mod processor;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod stdlib;
pub mod tokenizer;

pub use argument::{ArgumentMatch, ArgumentResolver};
pub use command::{ArgType, Command};
pub use completion::{Candidate, CandidateKind, Completion, CompletionProvider, CompletionRequest};
pub use processor::{CommandContext, CommandHandler, CommandOutcome, CommandProcessor, HandlerError};
pub use registry::CommandRegistry;
pub use resolver::{Resolution, Resolver};
pub use scope::{ContainerView, WorldSnapshot};
pub use tokenizer::{InputToken, InputTokenizer};
