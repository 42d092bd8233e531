//! Event dispatch and cooperative scheduling for Textspace bot scripts.
//!
//! ```text
//! host event ──► Engine::dispatch ──► TriggerTable ──► Scheduler::spawn
//!                                                          │
//! host timer ──► Engine::tick(now) ──► one turn per ready instance
//!                                          │
//!                                          ▼
//!                                     ScriptHost (world)
//! ```
//!
//! Many instances run interleaved on one thread. An instance gives up
//! control at a `wait`, at a function call, or when its per-turn
//! instruction budget runs out, so no script can stall the others.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod events;
pub mod scheduler;

pub use config::EngineConfig;
pub use engine::Engine;
pub use events::{EventContext, TriggerTable};
pub use scheduler::{InstanceId, Scheduler, TickReport};
