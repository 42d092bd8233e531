//! Line editor abstraction for the REPL.
//!
//! The REPL talks to a [`LineEditor`]; the rustyline implementation wires
//! tab completion to the session's completion provider so candidates reflect
//! what the player can currently see.

use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator};
use textspace_commands::CandidateKind;
use textspace_foundation::{Error, Result};

use crate::session::SharedSession;

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);
}

/// Tab completion backed by the session.
pub struct SessionCompleter {
    session: SharedSession,
    user: String,
}

impl SessionCompleter {
    /// Creates a completer for one user.
    #[must_use]
    pub fn new(session: SharedSession, user: impl Into<String>) -> Self {
        Self {
            session,
            user: user.into(),
        }
    }

    /// Candidates for the text before the cursor, as `(start, pairs)`.
    ///
    /// `start` is the byte offset where the partial word begins.
    #[must_use]
    pub fn candidates(&self, line: &str) -> (usize, Vec<Pair>) {
        let Ok(session) = self.session.lock() else {
            return (line.len(), Vec::new());
        };
        let completion = session.complete(&self.user, line);
        let start = line
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + line[i..].chars().next().map_or(1, char::len_utf8));
        let pairs = completion
            .candidates
            .into_iter()
            .map(|c| {
                let replacement = match c.kind {
                    CandidateKind::Help { .. } => format!("{} ", c.insert_text),
                    _ => c.insert_text,
                };
                Pair {
                    display: c.display,
                    replacement,
                }
            })
            .collect();
        (start, pairs)
    }
}

impl Completer for SessionCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(&line[..pos]))
    }
}

/// Helper for rustyline that provides completion, hints and highlighting.
#[derive(Helper, Completer, Hinter, Validator)]
struct TextspaceHelper {
    #[rustyline(Completer)]
    completer: SessionCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Highlighter for TextspaceHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        // Bold the command word.
        match line.find(char::is_whitespace) {
            Some(end) if end > 0 => Cow::Owned(format!("\x1b[1m{}\x1b[0m{}", &line[..end], &line[end..])),
            _ => Cow::Borrowed(line),
        }
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<TextspaceHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates an editor completing against `session` on behalf of `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new(session: SharedSession, user: &str) -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::internal(e.to_string()))?
            .build();

        let helper = TextspaceHelper {
            completer: SessionCompleter::new(session, user),
            hinter: HistoryHinter::new(),
        };

        let mut editor =
            Editor::with_config(config).map_err(|e| Error::internal(e.to_string()))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::internal(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}
