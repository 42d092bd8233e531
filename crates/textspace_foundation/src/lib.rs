//! Shared error taxonomy for Textspace.
//!
//! This crate provides:
//! - [`Error`] - Rich error type with optional [`ErrorContext`]
//! - [`ErrorKind`] - Registration, parse, resolution and execution failures
//! - [`RuntimeError`] - Faults that terminate a single script instance

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;

pub use error::{Error, ErrorContext, ErrorKind, Result, RuntimeError};
