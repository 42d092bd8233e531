//! REPL, world host, configuration and script library export for Textspace.
//!
//! This crate provides:
//! - [`World`] - rooms, users, bots and items; the host scripts act on
//! - [`Session`] - world, engine and registry behind one lock, plus the
//!   background [`Pump`] that ticks scripts
//! - [`Repl`] - interactive read-eval-print loop with tab completion
//! - [`RuntimeConfig`] - TOML world and engine configuration
//! - [`ScriptLibrary`] - `MessagePack` export and import of loaded scripts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod editor;
pub mod handlers;
pub mod repl;
pub mod serialize;
pub mod session;
pub mod world;

pub use config::RuntimeConfig;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use handlers::standard_processor;
pub use repl::Repl;
pub use serialize::ScriptLibrary;
pub use session::{Pump, Session, SharedSession};
pub use world::{Delivery, World, WorldError};
