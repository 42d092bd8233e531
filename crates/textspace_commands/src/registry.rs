//! Command registry.
//!
//! Maps every primary name and alias to its owning [`Command`]. The registry
//! is filled during start-up and then shared immutably (typically behind an
//! `Arc`); every read path takes `&self`, so registration cannot interleave
//! with resolution.

use std::collections::HashMap;
use std::sync::Arc;

use textspace_foundation::{Error, Result};
use tracing::debug;

use crate::command::Command;

/// Registry of all known commands.
#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    /// Commands in registration order.
    commands: Vec<Arc<Command>>,
    /// Lowercase name/alias -> index into `commands`.
    tokens: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of commands, failing on the first conflict.
    ///
    /// # Errors
    /// Returns `DuplicateAlias` if two commands claim the same token.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Result<Self> {
        let mut registry = Self::new();
        for command in commands {
            registry.register(command)?;
        }
        Ok(registry)
    }

    /// Registers a command under its name and every alias.
    ///
    /// Registration is all-or-nothing: on conflict nothing is inserted.
    ///
    /// # Errors
    /// Returns `DuplicateAlias` if the name or any alias is already claimed
    /// by a different command.
    pub fn register(&mut self, command: Command) -> Result<Arc<Command>> {
        for token in command.tokens() {
            if let Some(&owner) = self.tokens.get(token) {
                return Err(Error::duplicate_alias(
                    token,
                    self.commands[owner].name.clone(),
                    command.name.clone(),
                ));
            }
        }

        let index = self.commands.len();
        for token in command.tokens() {
            self.tokens.insert(token.to_string(), index);
        }
        debug!(command = %command.name, aliases = ?command.aliases, "registered command");

        let command = Arc::new(command);
        self.commands.push(Arc::clone(&command));
        Ok(command)
    }

    /// Case-insensitive exact lookup by primary name or alias.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&Arc<Command>> {
        self.index_of(token).map(|i| &self.commands[i])
    }

    /// Case-insensitive lookup by primary name only.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Command>> {
        self.lookup(name).filter(|cmd| cmd.name.eq_ignore_ascii_case(name))
    }

    /// Returns the commands visible to a caller, in registration order.
    #[must_use]
    pub fn all_commands(&self, is_admin: bool) -> Vec<&Arc<Command>> {
        self.commands
            .iter()
            .filter(|cmd| cmd.is_visible_to(is_admin))
            .collect()
    }

    /// Returns visible commands whose name or any alias starts with `prefix`.
    ///
    /// Each command appears at most once, in registration order, no matter
    /// how many of its tokens match.
    #[must_use]
    pub fn prefix_matches(&self, prefix: &str, is_admin: bool) -> Vec<&Arc<Command>> {
        let prefix = prefix.to_lowercase();
        self.commands
            .iter()
            .filter(|cmd| cmd.is_visible_to(is_admin))
            .filter(|cmd| cmd.tokens().any(|t| t.starts_with(&prefix)))
            .collect()
    }

    /// Iterates over every registered command regardless of permission.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter()
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn index_of(&self, token: &str) -> Option<usize> {
        if let Some(&i) = self.tokens.get(token) {
            return Some(i);
        }
        self.tokens.get(&token.to_lowercase()).copied()
    }
}
