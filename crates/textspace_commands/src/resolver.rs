//! Command resolution.
//!
//! Turns the first word of an input line into a command, honoring aliases,
//! unambiguous prefixes, and the caller's permission level.
//!
//! Priority order:
//! 1. A single-character token equal to a single-letter alias
//! 2. An exact primary name
//! 3. A unique prefix of any name or alias (deduplicated by command)

use std::sync::Arc;

use textspace_foundation::{Error, Result};

use crate::command::Command;
use crate::registry::CommandRegistry;

/// Outcome of resolving one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one command matched.
    Resolved(Arc<Command>),
    /// Several commands matched; primary names, sorted.
    Ambiguous(Vec<String>),
    /// No visible command matched.
    NotFound,
}

impl Resolution {
    /// Returns the resolved command, if any.
    #[must_use]
    pub fn command(&self) -> Option<&Arc<Command>> {
        match self {
            Self::Resolved(cmd) => Some(cmd),
            _ => None,
        }
    }

    /// Converts the outcome into a `Result`, mapping failures onto the
    /// error taxonomy.
    ///
    /// # Errors
    /// `AmbiguousCommand` or `CommandNotFound`.
    pub fn into_result(self, token: &str) -> Result<Arc<Command>> {
        match self {
            Self::Resolved(cmd) => Ok(cmd),
            Self::Ambiguous(names) => Err(Error::ambiguous(names)),
            Self::NotFound => Err(Error::not_found(token)),
        }
    }
}

/// Resolves input tokens against a registry snapshot.
///
/// Resolution is a pure function of the token, the permission flag and the
/// registry; the resolver holds no state between calls.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Resolver<'r> {
    /// Creates a resolver over the given registry.
    #[must_use]
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Resolves a token for a caller with the given permission.
    #[must_use]
    pub fn resolve(&self, token: &str, is_admin: bool) -> Resolution {
        let token = token.trim();
        if token.is_empty() {
            return Resolution::NotFound;
        }
        let lowered = token.to_lowercase();

        if lowered.chars().count() == 1 {
            if let Some(cmd) = self.registry.lookup(&lowered) {
                if cmd.is_visible_to(is_admin) && cmd.aliases.iter().any(|a| *a == lowered) {
                    return Resolution::Resolved(Arc::clone(cmd));
                }
            }
        }

        if let Some(cmd) = self.registry.get(&lowered) {
            if cmd.is_visible_to(is_admin) {
                return Resolution::Resolved(Arc::clone(cmd));
            }
        }

        let candidates = self.registry.prefix_matches(&lowered, is_admin);
        match candidates.as_slice() {
            [] => Resolution::NotFound,
            [only] => Resolution::Resolved(Arc::clone(only)),
            many => {
                let mut names: Vec<String> = many.iter().map(|c| c.name.clone()).collect();
                names.sort();
                Resolution::Ambiguous(names)
            }
        }
    }
}
