//! Command metadata.
//!
//! A [`Command`] describes how a command is named, who may use it, and what
//! its arguments look like. Handlers live elsewhere; the registry and the
//! resolver never look past this metadata.

use std::fmt;
use std::str::FromStr;

use textspace_foundation::{Error, Result};

/// The fixed set of movement directions offered by the `direction` argument type.
pub const DIRECTIONS: [&str; 6] = ["north", "south", "east", "west", "up", "down"];

/// Argument type tags, used by completion and argument resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgType {
    /// Item lying in the caller's room.
    RoomItem,
    /// Item carried by the caller.
    InventoryItem,
    /// Anything the caller can look at: room items, inventory, users, bots.
    Examinable,
    /// Closed container.
    Openable,
    /// Open container.
    Closeable,
    /// Open container that can receive items.
    Container,
    /// One of [`DIRECTIONS`].
    Direction,
    /// Another user.
    User,
    /// Room identifier (admin callers only).
    Room,
    /// Free text; never completed.
    Text,
    /// A literal word separating two argument slots, such as `in` or `to`.
    Preposition(String),
}

impl ArgType {
    /// Returns the wire tag for this type.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::RoomItem => "room_item",
            Self::InventoryItem => "inventory_item",
            Self::Examinable => "examinable",
            Self::Openable => "openable",
            Self::Closeable => "closeable",
            Self::Container => "container",
            Self::Direction => "direction",
            Self::User => "user",
            Self::Room => "room",
            Self::Text => "text",
            Self::Preposition(word) => word,
        }
    }

    /// Returns the placeholder shown in help listings, e.g. `<user>`.
    #[must_use]
    pub fn placeholder(&self) -> String {
        match self {
            Self::Preposition(word) => word.clone(),
            Self::RoomItem | Self::InventoryItem => "<item>".to_string(),
            Self::Text => "<message>".to_string(),
            other => format!("<{}>", other.tag()),
        }
    }

    /// Returns true if this slot is a literal preposition.
    #[must_use]
    pub fn is_preposition(&self) -> bool {
        matches!(self, Self::Preposition(_))
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ArgType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "room_item" => Self::RoomItem,
            "inventory_item" | "inv_item" => Self::InventoryItem,
            "examinable" => Self::Examinable,
            "openable" => Self::Openable,
            "closeable" => Self::Closeable,
            "container" | "open_container" => Self::Container,
            "direction" => Self::Direction,
            "user" => Self::User,
            "room" => Self::Room,
            "text" | "message" | "string" => Self::Text,
            other => match other.strip_prefix("prep:") {
                Some(word) if !word.is_empty() => Self::Preposition(word.to_lowercase()),
                _ => return Err(Error::config(format!("unknown argument type: {other}"))),
            },
        })
    }
}

/// A registered command.
///
/// Names and aliases are stored lowercase; matching is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    /// Primary name, unique across the registry.
    pub name: String,
    /// Alternate tokens, including single letters.
    pub aliases: Vec<String>,
    /// Whether only admin callers may see and run this command.
    pub admin_only: bool,
    /// Minimum number of argument tokens.
    pub min_args: usize,
    /// Usage string shown on argument errors.
    pub usage: String,
    /// Argument type per position.
    pub arg_types: Vec<ArgType>,
    /// Grouping tag for help listings.
    pub category: String,
}

impl Command {
    /// Creates a public command with no aliases or arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().to_lowercase();
        Self {
            usage: name.clone(),
            name,
            aliases: Vec::new(),
            admin_only: false,
            min_args: 0,
            arg_types: Vec::new(),
            category: "General".to_string(),
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into().to_lowercase();
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    /// Adds several aliases.
    #[must_use]
    pub fn with_aliases<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        aliases.into_iter().fold(self, |cmd, alias| cmd.with_alias(alias))
    }

    /// Marks the command as admin-only.
    #[must_use]
    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    /// Sets the minimum argument count.
    #[must_use]
    pub fn with_min_args(mut self, min_args: usize) -> Self {
        self.min_args = min_args;
        self
    }

    /// Sets the usage string.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the argument types.
    #[must_use]
    pub fn with_args(mut self, arg_types: impl IntoIterator<Item = ArgType>) -> Self {
        self.arg_types = arg_types.into_iter().collect();
        self
    }

    /// Sets the help category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Returns true if a caller with the given permission can see this command.
    #[must_use]
    pub fn is_visible_to(&self, is_admin: bool) -> bool {
        is_admin || !self.admin_only
    }

    /// Iterates over the primary name followed by every alias.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns the preposition slot, if the command's grammar has one.
    #[must_use]
    pub fn preposition(&self) -> Option<(usize, &str)> {
        self.arg_types
            .iter()
            .enumerate()
            .find_map(|(i, t)| match t {
                ArgType::Preposition(word) => Some((i, word.as_str())),
                _ => None,
            })
    }

    /// Renders `name (a, b) <arg> <arg>` for help listings.
    #[must_use]
    pub fn synopsis(&self) -> String {
        let mut out = self.name.clone();
        if !self.aliases.is_empty() {
            out.push_str(" (");
            out.push_str(&self.aliases.join(", "));
            out.push(')');
        }
        for arg in &self.arg_types {
            out.push(' ');
            out.push_str(&arg.placeholder());
        }
        out
    }
}
