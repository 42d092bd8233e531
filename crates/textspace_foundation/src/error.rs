//! Error types for the Textspace system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Errors fall into four phases:
//! - registration (`DuplicateAlias`), which aborts start-up
//! - script load (`Syntax`), which rejects one script
//! - resolution (`AmbiguousCommand`, `CommandNotFound`), surfaced to the caller
//! - execution (`ScriptRuntime`), which terminates one script instance

use std::fmt;

use thiserror::Error;

/// Result type alias used throughout Textspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Textspace operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a duplicate alias error.
    #[must_use]
    pub fn duplicate_alias(
        alias: impl Into<String>,
        existing: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::DuplicateAlias {
            alias: alias.into(),
            existing: existing.into(),
            command: command.into(),
        })
    }

    /// Creates a script syntax error.
    #[must_use]
    pub fn syntax(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax {
            line,
            column,
            message: message.into(),
        })
    }

    /// Creates an ambiguous command error from the candidate names.
    #[must_use]
    pub fn ambiguous(candidates: Vec<String>) -> Self {
        Self::new(ErrorKind::AmbiguousCommand(candidates))
    }

    /// Creates an unknown command error.
    #[must_use]
    pub fn not_found(token: impl Into<String>) -> Self {
        Self::new(ErrorKind::CommandNotFound(token.into()))
    }

    /// Creates a script runtime error.
    #[must_use]
    pub fn runtime(error: RuntimeError) -> Self {
        Self::new(ErrorKind::ScriptRuntime(error))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns the runtime error if this is an execution-time failure.
    #[must_use]
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match &self.kind {
            ErrorKind::ScriptRuntime(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if this error must abort the operation that raised it
    /// (command registration or script load).
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::DuplicateAlias { .. } | ErrorKind::Syntax { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e.to_string()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// A command name or alias is already claimed by another command.
    #[error("alias '{alias}' of command '{command}' is already claimed by '{existing}'")]
    DuplicateAlias {
        /// The contested token.
        alias: String,
        /// The command that already owns the token.
        existing: String,
        /// The command whose registration was rejected.
        command: String,
    },

    /// Script source could not be parsed.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// Description of the problem.
        message: String,
    },

    /// Input prefix matched more than one command.
    #[error("ambiguous command, candidates: {}", .0.join(", "))]
    AmbiguousCommand(Vec<String>),

    /// Input matched no visible command.
    #[error("unknown command: {0}")]
    CommandNotFound(String),

    /// A script instance failed while executing.
    #[error("script runtime error: {0}")]
    ScriptRuntime(RuntimeError),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Execution-time faults. Each one terminates only the instance that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A variable was read before being set.
    UndefinedVariable(String),
    /// A function was called before its definition executed.
    UndefinedFunction(String),
    /// Call depth exceeded the configured bound.
    StackOverflow {
        /// The configured limit.
        limit: usize,
    },
    /// An instruction received an argument it cannot use.
    InvalidArgument(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            Self::UndefinedFunction(name) => write!(f, "undefined function: {name}"),
            Self::StackOverflow { limit } => {
                write!(f, "stack overflow: call depth exceeded {limit}")
            }
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Script or command name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<u32>,
    /// Column number in source.
    pub column: Option<u32>,
    /// Active function calls, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        for frame in &self.stack {
            write!(f, "\n  called from {frame}")?;
        }
        Ok(())
    }
}
