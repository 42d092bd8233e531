//! Bot scripting language for Textspace.
//!
//! Scripts are short line-oriented programs attached to bots:
//!
//! ```text
//! # greet newcomers
//! function greet {
//!   say Welcome, $user!
//!   wait 2
//!   random_say Enjoy your stay|Mind the stairs
//! }
//! call greet
//! ```
//!
//! This crate provides:
//! - [`Lexer`] and [`parse`] - source to [`Program`]
//! - [`pretty`] - [`Program`] back to source
//! - [`Instance`] - resumable execution with an explicit frame stack
//! - [`ScriptHost`] - the world operations a script may perform
//! - [`Script`] - a parsed script with its owner and trigger

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod script;
pub mod span;
pub mod token;

pub use ast::{Block, Fragment, Instruction, Program, Term, Text};
pub use host::{Effect, HostError, RecordingHost, ScriptHost};
pub use interpreter::{Bindings, Instance, Limits, TurnOutcome};
pub use lexer::Lexer;
pub use parser::{Parser, parse};
pub use script::{EventKind, Script, Trigger};
pub use span::Span;
