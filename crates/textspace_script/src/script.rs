//! Loaded scripts and their triggers.

use std::fmt;
use std::str::FromStr;

use textspace_foundation::{Error, ErrorContext, Result};

use crate::ast::Program;
use crate::parser::parse;

/// World events scripts can react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EventKind {
    /// A user entered a room.
    EnterRoom,
    /// A user left a room.
    LeaveRoom,
}

impl EventKind {
    /// Wire name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnterRoom => "enter_room",
            Self::LeaveRoom => "leave_room",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "enter_room" => Ok(Self::EnterRoom),
            "leave_room" => Ok(Self::LeaveRoom),
            other => Err(Error::config(format!("unknown event type: {other}"))),
        }
    }
}

/// When a script launches automatically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    /// Event type.
    pub event: EventKind,
    /// Room filter; `None` matches any room.
    pub room: Option<String>,
}

impl Trigger {
    /// A trigger for one room.
    #[must_use]
    pub fn in_room(event: EventKind, room: impl Into<String>) -> Self {
        Self {
            event,
            room: Some(room.into()),
        }
    }

    /// A trigger for every room.
    #[must_use]
    pub const fn any_room(event: EventKind) -> Self {
        Self { event, room: None }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.room {
            Some(room) => write!(f, "{} in {room}", self.event),
            None => write!(f, "{} anywhere", self.event),
        }
    }
}

/// A script owned by a bot, parsed once at load time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    /// Unique script name.
    pub name: String,
    /// Owning bot.
    pub bot: String,
    /// Original source text.
    pub source: String,
    /// Parsed program.
    pub program: Program,
    /// Automatic launch condition.
    pub trigger: Option<Trigger>,
}

impl Script {
    /// Parses `source` and builds a script.
    ///
    /// # Errors
    /// Returns a `Syntax` error naming the script if the source is malformed.
    pub fn load(
        name: impl Into<String>,
        bot: impl Into<String>,
        source: impl Into<String>,
        trigger: Option<Trigger>,
    ) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        let program = parse(&source).map_err(|err| {
            let context = match &err.kind {
                textspace_foundation::ErrorKind::Syntax { line, column, .. } => {
                    ErrorContext::new()
                        .with_source(&name)
                        .with_position(*line, *column)
                }
                _ => ErrorContext::new().with_source(&name),
            };
            err.with_context(context)
        })?;
        Ok(Self {
            name,
            bot: bot.into(),
            source,
            program,
            trigger,
        })
    }
}
