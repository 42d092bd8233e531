//! Argument resolution.
//!
//! Maps a typed argument onto one of the names visible to the caller:
//! exact match first, then case-insensitive, then a unique prefix.

use crate::command::ArgType;
use crate::scope::WorldSnapshot;

/// Result of resolving one argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentMatch {
    /// A single name matched (or free text passed through).
    Found(String),
    /// Several names share the typed prefix; sorted.
    Ambiguous(Vec<String>),
    /// Nothing in scope matches.
    NotFound,
}

/// Resolves arguments against a caller's snapshot.
pub struct ArgumentResolver;

impl ArgumentResolver {
    /// Resolves `arg` as a value of `arg_type`.
    #[must_use]
    pub fn resolve(
        arg: &str,
        arg_type: &ArgType,
        world: &WorldSnapshot,
        is_admin: bool,
    ) -> ArgumentMatch {
        if matches!(arg_type, ArgType::Text) {
            return ArgumentMatch::Found(arg.to_string());
        }
        let arg = arg.trim();
        if arg.is_empty() {
            return ArgumentMatch::NotFound;
        }

        let options = world.names_for(arg_type, is_admin);

        if let Some(exact) = options.iter().find(|o| ***o == *arg) {
            return ArgumentMatch::Found((*exact).to_string());
        }
        if let Some(folded) = options.iter().find(|o| o.eq_ignore_ascii_case(arg)) {
            return ArgumentMatch::Found((*folded).to_string());
        }

        let lowered = arg.to_lowercase();
        let mut matches: Vec<String> = options
            .iter()
            .filter(|o| o.to_lowercase().starts_with(&lowered))
            .map(|o| (*o).to_string())
            .collect();
        match matches.len() {
            0 => ArgumentMatch::NotFound,
            1 => ArgumentMatch::Found(matches.remove(0)),
            _ => {
                matches.sort();
                ArgumentMatch::Ambiguous(matches)
            }
        }
    }
}
