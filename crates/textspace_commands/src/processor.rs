//! Command processing pipeline.
//!
//! Orchestrates the flow from a raw input line to handler output:
//!
//! ```text
//! "tell alice hi"
//!        │
//!        ▼
//!   TOKENIZE        → ["tell", "alice", "hi"]     ("\"hi" is shorthand for "say hi")
//!        │
//!        ▼
//!   RESOLVE         → tell | Ambiguous(..) | NotFound
//!        │
//!        ▼
//!   VALIDATE        → min_args satisfied, else Usage
//!        │
//!        ▼
//!   HANDLE          → handler(state, ctx, args) → output or HandlerError
//! ```
//!
//! Handlers are kept apart from the registry, keyed by primary name. The
//! processor is generic over the host's state type `S`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use textspace_foundation::{Error, Result};
use thiserror::Error;
use tracing::debug;

use crate::command::Command;
use crate::registry::CommandRegistry;
use crate::resolver::{Resolution, Resolver};
use crate::tokenizer::InputTokenizer;

/// Failure reported by a command handler.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The referenced thing is not in scope.
    #[error("You don't see '{0}' here.")]
    NotFound(String),
    /// The argument matched several things.
    #[error("Which do you mean: {}?", .0.join(", "))]
    Ambiguous(Vec<String>),
    /// The argument is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The caller lacks permission.
    #[error("Access denied. Admin privileges required.")]
    Denied,
    /// No handler is installed for the command.
    #[error("Command '{0}' is not available.")]
    Unavailable(String),
    /// Any other failure, with a message for the caller.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Returns a stable tag for this error.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Ambiguous(_) => "ambiguous",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Denied => "denied",
            Self::Unavailable(_) => "unavailable",
            Self::Failed(_) => "failed",
        }
    }
}

/// Information handed to a handler alongside its arguments.
#[derive(Clone, Copy, Debug)]
pub struct CommandContext<'a> {
    /// Who issued the command.
    pub caller: &'a str,
    /// Caller permission.
    pub is_admin: bool,
    /// The resolved command.
    pub command: &'a Command,
    /// The raw input line.
    pub line: &'a str,
}

/// Executes one command against host state `S`.
pub trait CommandHandler<S>: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    /// Returns a [`HandlerError`] describing why the command failed.
    fn handle(
        &self,
        state: &mut S,
        ctx: &CommandContext<'_>,
        args: &[String],
    ) -> std::result::Result<String, HandlerError>;
}

impl<S, F> CommandHandler<S> for F
where
    F: Fn(&mut S, &CommandContext<'_>, &[String]) -> std::result::Result<String, HandlerError>
        + Send
        + Sync,
{
    fn handle(
        &self,
        state: &mut S,
        ctx: &CommandContext<'_>,
        args: &[String],
    ) -> std::result::Result<String, HandlerError> {
        self(state, ctx, args)
    }
}

/// Result of processing one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Blank input.
    Empty,
    /// The handler produced output.
    Output(String),
    /// The command word matched several commands.
    Ambiguous(Vec<String>),
    /// The command word matched nothing visible.
    Unknown(String),
    /// Too few arguments; carries the usage string.
    Usage(String),
    /// The handler failed.
    Failed(HandlerError),
}

impl CommandOutcome {
    /// Returns true if a handler ran successfully.
    #[must_use]
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output(_))
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Please enter a command. Type 'help' for available commands."),
            Self::Output(text) => f.write_str(text),
            Self::Ambiguous(names) => {
                write!(f, "Ambiguous command. Did you mean: {}?", names.join(", "))
            }
            Self::Unknown(token) => write!(f, "Unknown command: {token}"),
            Self::Usage(usage) => write!(f, "Usage: {usage}"),
            Self::Failed(err) => write!(f, "{err}"),
        }
    }
}

/// Parses, resolves, validates and dispatches command lines.
pub struct CommandProcessor<S> {
    registry: Arc<CommandRegistry>,
    handlers: HashMap<String, Box<dyn CommandHandler<S>>>,
}

impl<S> CommandProcessor<S> {
    /// Creates a processor over a frozen registry.
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            handlers: HashMap::new(),
        }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Installs a handler for a registered command.
    ///
    /// # Errors
    /// Returns `CommandNotFound` if no command has this primary name.
    pub fn register_handler<H>(&mut self, name: &str, handler: H) -> Result<()>
    where
        H: CommandHandler<S> + 'static,
    {
        let Some(cmd) = self.registry.get(name) else {
            return Err(Error::not_found(name));
        };
        self.handlers.insert(cmd.name.clone(), Box::new(handler));
        Ok(())
    }

    /// Installs a closure handler.
    ///
    /// # Errors
    /// Returns `CommandNotFound` if no command has this primary name.
    pub fn register_fn<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut S, &CommandContext<'_>, &[String]) -> std::result::Result<String, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.register_handler(name, handler)
    }

    /// Returns true if a handler is installed for the command.
    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_lowercase())
    }

    /// Processes one input line for a caller.
    pub fn process(&self, state: &mut S, caller: &str, is_admin: bool, line: &str) -> CommandOutcome {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CommandOutcome::Empty;
        }

        let (token, args) = match trimmed.strip_prefix('"') {
            Some(rest) => {
                let message = rest.trim().trim_end_matches('"').trim_end();
                let args = if message.is_empty() {
                    Vec::new()
                } else {
                    vec![message.to_string()]
                };
                ("say".to_string(), args)
            }
            None => {
                let mut words = InputTokenizer::words(trimmed);
                let token = words.remove(0);
                (token, words)
            }
        };

        let cmd = match Resolver::new(&self.registry).resolve(&token, is_admin) {
            Resolution::Resolved(cmd) => cmd,
            Resolution::Ambiguous(names) => {
                debug!(caller, token = %token, candidates = ?names, "ambiguous command");
                return CommandOutcome::Ambiguous(names);
            }
            Resolution::NotFound => {
                debug!(caller, token = %token, "unknown command");
                return CommandOutcome::Unknown(token);
            }
        };

        if args.len() < cmd.min_args {
            return CommandOutcome::Usage(cmd.usage.clone());
        }

        let Some(handler) = self.handlers.get(&cmd.name) else {
            return CommandOutcome::Failed(HandlerError::Unavailable(cmd.name.clone()));
        };

        let ctx = CommandContext {
            caller,
            is_admin,
            command: &cmd,
            line,
        };
        debug!(caller, command = %cmd.name, args = args.len(), "dispatching command");
        match handler.handle(state, &ctx, &args) {
            Ok(output) => CommandOutcome::Output(output),
            Err(err) => {
                debug!(caller, command = %cmd.name, error = %err, "command failed");
                CommandOutcome::Failed(err)
            }
        }
    }
}
