//! Context-sensitive completion.
//!
//! Given the text a caller has typed so far, the [`CompletionProvider`]
//! proposes command names, aliases, or argument values drawn from a
//! [`WorldSnapshot`]. Three modes:
//!
//! - nothing typed: a help listing of every visible command, grouped by category
//! - first word being typed: command names and, independently, aliases
//! - a recognized command: values for the argument slot under the cursor
//!
//! Commands whose grammar contains a preposition (`put <item> in <container>`)
//! get multi-word aware completion on both sides of the preposition.

use std::sync::Arc;

use crate::command::{ArgType, Command};
use crate::registry::CommandRegistry;
use crate::resolver::{Resolution, Resolver};
use crate::scope::WorldSnapshot;
use crate::tokenizer::InputTokenizer;

/// A completion request.
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    /// The word under the cursor (possibly empty).
    pub partial: &'a str,
    /// Who is asking.
    pub caller: &'a str,
    /// Caller permission.
    pub is_admin: bool,
    /// The whole input line up to the cursor, `partial` included.
    pub line: &'a str,
}

impl<'a> CompletionRequest<'a> {
    /// Creates a request from its parts.
    #[must_use]
    pub fn new(partial: &'a str, caller: &'a str, is_admin: bool, line: &'a str) -> Self {
        Self {
            partial,
            caller,
            is_admin,
            line,
        }
    }

    /// Creates a request from a line, taking the trailing word as the partial.
    #[must_use]
    pub fn from_line(line: &'a str, caller: &'a str, is_admin: bool) -> Self {
        let partial = match line.rfind(char::is_whitespace) {
            Some(i) => &line[i + line[i..].chars().next().map_or(1, char::len_utf8)..],
            None => line,
        };
        Self::new(partial, caller, is_admin, line)
    }
}

/// What kind of thing a candidate completes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CandidateKind {
    /// Help listing entry for a command in the given category.
    Help {
        /// Category tag of the command.
        category: String,
    },
    /// A command's primary name.
    Command,
    /// An alias; carries the owning command's primary name.
    Alias {
        /// Primary name of the owning command.
        command: String,
    },
    /// A value for an argument slot.
    Argument(ArgType),
    /// A grammar word such as `in` or `to`.
    Preposition,
}

/// One completion candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Candidate {
    /// Text shown to the user.
    pub display: String,
    /// Text that replaces the partial word.
    pub insert_text: String,
    /// Candidate classification.
    pub kind: CandidateKind,
}

/// Completion response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Completion {
    /// Ranked candidates.
    pub candidates: Vec<Candidate>,
    /// Longest prefix shared by every candidate's insert text, when it
    /// extends beyond what was typed.
    pub common_prefix: Option<String>,
}

impl Completion {
    fn new(candidates: Vec<Candidate>, partial: &str) -> Self {
        let common_prefix = common_prefix(candidates.iter().map(|c| c.insert_text.as_str()))
            .filter(|prefix| prefix.chars().count() > partial.chars().count());
        Self {
            candidates,
            common_prefix,
        }
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the insert texts in order.
    #[must_use]
    pub fn insert_texts(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.insert_text.as_str()).collect()
    }
}

/// Returns the longest string that prefixes every input, or `None` for no input.
#[must_use]
pub fn common_prefix<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut iter = texts.into_iter();
    let first = iter.next()?;
    let mut len = first.len();
    for text in iter {
        len = first[..len]
            .char_indices()
            .zip(text.chars())
            .find(|((_, a), b)| a != b)
            .map_or_else(|| len.min(text.len()), |((i, _), _)| i);
        // Both strings share bytes up to `len`, so it lies on a char boundary of `first`.
        while !first.is_char_boundary(len) {
            len -= 1;
        }
    }
    Some(first[..len].to_string())
}

/// Produces completion candidates against a registry.
#[derive(Clone, Copy, Debug)]
pub struct CompletionProvider<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> CompletionProvider<'r> {
    /// Creates a provider over the given registry.
    #[must_use]
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Completes a request using the caller's world snapshot.
    #[must_use]
    pub fn complete(&self, request: &CompletionRequest<'_>, world: &WorldSnapshot) -> Completion {
        if request.line.trim_start().starts_with('"') {
            return Completion::default();
        }

        let head = request
            .line
            .strip_suffix(request.partial)
            .unwrap_or(request.line);
        let words = InputTokenizer::words(head);

        let candidates = match words.split_first() {
            None if request.partial.is_empty() => self.help_listing(request.is_admin),
            None => self.command_candidates(request.partial, request.is_admin),
            Some((first, args)) => {
                match Resolver::new(self.registry).resolve(first, request.is_admin) {
                    Resolution::Resolved(cmd) => self.argument_candidates(&cmd, args, request, world),
                    Resolution::Ambiguous(_) | Resolution::NotFound => Vec::new(),
                }
            }
        };

        Completion::new(candidates, request.partial)
    }

    /// Every visible command, grouped by category in first-seen order.
    fn help_listing(&self, is_admin: bool) -> Vec<Candidate> {
        let mut groups: Vec<(&str, Vec<&Arc<Command>>)> = Vec::new();
        for cmd in self.registry.all_commands(is_admin) {
            match groups.iter_mut().find(|(cat, _)| *cat == cmd.category) {
                Some((_, members)) => members.push(cmd),
                None => groups.push((cmd.category.as_str(), vec![cmd])),
            }
        }

        groups
            .into_iter()
            .flat_map(|(category, members)| {
                members.into_iter().map(move |cmd| Candidate {
                    display: cmd.synopsis(),
                    insert_text: cmd.name.clone(),
                    kind: CandidateKind::Help {
                        category: category.to_string(),
                    },
                })
            })
            .collect()
    }

    /// Command names and aliases, each matched on its own.
    fn command_candidates(&self, partial: &str, is_admin: bool) -> Vec<Candidate> {
        let prefix = partial.to_lowercase();
        let mut out = Vec::new();
        for cmd in self.registry.all_commands(is_admin) {
            if cmd.name.starts_with(&prefix) {
                out.push(Candidate {
                    display: cmd.synopsis(),
                    insert_text: cmd.name.clone(),
                    kind: CandidateKind::Command,
                });
            }
            for alias in cmd.aliases.iter().filter(|a| a.starts_with(&prefix)) {
                out.push(Candidate {
                    display: format!("{alias} ({})", cmd.name),
                    insert_text: alias.clone(),
                    kind: CandidateKind::Alias {
                        command: cmd.name.clone(),
                    },
                });
            }
        }
        out
    }

    fn argument_candidates(
        &self,
        cmd: &Command,
        args: &[String],
        request: &CompletionRequest<'_>,
        world: &WorldSnapshot,
    ) -> Vec<Candidate> {
        if let Some((index, prep)) = cmd.preposition() {
            return self.prepositional_candidates(cmd, index, prep, args, request, world);
        }
        let Some(last) = cmd.arg_types.len().checked_sub(1) else {
            return Vec::new();
        };

        // The final slot absorbs any extra words, so multi-word names complete there.
        let (slot, typed) = if args.len() < last {
            (args.len(), &args[..0])
        } else {
            (last, &args[last..])
        };
        slot_candidates(&cmd.arg_types[slot], typed, request, world)
    }

    fn prepositional_candidates(
        &self,
        cmd: &Command,
        index: usize,
        prep: &str,
        args: &[String],
        request: &CompletionRequest<'_>,
        world: &WorldSnapshot,
    ) -> Vec<Candidate> {
        let before = cmd.arg_types[..index].last();
        let after = cmd.arg_types.get(index + 1);

        // The preposition only counts once at least one item word precedes it.
        let typed_prep = args
            .iter()
            .skip(1)
            .position(|w| w.eq_ignore_ascii_case(prep))
            .map(|p| p + 1);
        if let Some(pos) = typed_prep {
            return after
                .map(|t| slot_candidates(t, &args[pos + 1..], request, world))
                .unwrap_or_default();
        }

        let mut out = before
            .map(|t| slot_candidates(t, args, request, world))
            .unwrap_or_default();

        let partial = request.partial.to_lowercase();
        let prep_matches = prep.starts_with(&partial);
        if !args.is_empty() && (partial.is_empty() || prep_matches) {
            if prep_matches {
                let tail = after.map(ArgType::placeholder).unwrap_or_default();
                out.push(Candidate {
                    display: format!("{} {prep} {tail}", cmd.name).trim_end().to_string(),
                    insert_text: prep.to_string(),
                    kind: CandidateKind::Preposition,
                });
            }
            if let Some(t) = after {
                out.extend(slot_candidates(t, &[], request, world));
            }
        }
        out
    }
}

/// Candidates for one argument slot.
///
/// `typed` holds words already entered for this slot; names are matched as
/// whole words against them and the insert text is the remainder starting
/// at the partial word.
fn slot_candidates(
    arg_type: &ArgType,
    typed: &[String],
    request: &CompletionRequest<'_>,
    world: &WorldSnapshot,
) -> Vec<Candidate> {
    let mut prefix = typed.join(" ").to_lowercase();
    if !typed.is_empty() {
        prefix.push(' ');
    }
    prefix.push_str(&request.partial.to_lowercase());

    let mut out: Vec<Candidate> = world
        .names_for(arg_type, request.is_admin)
        .into_iter()
        .filter(|name| !(*arg_type == ArgType::User && name.eq_ignore_ascii_case(request.caller)))
        .filter_map(|name| {
            let words: Vec<&str> = name.split_whitespace().collect();
            if words.len() <= typed.len() {
                return None;
            }
            if !words.join(" ").to_lowercase().starts_with(&prefix) {
                return None;
            }
            Some(Candidate {
                display: name.to_string(),
                insert_text: words[typed.len()..].join(" "),
                kind: CandidateKind::Argument(arg_type.clone()),
            })
        })
        .collect();

    // Exact-case matches rank ahead of case-folded ones.
    out.sort_by_key(|c| !c.insert_text.starts_with(request.partial));
    out
}
