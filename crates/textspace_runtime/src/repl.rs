//! The interactive REPL.
//!
//! One local player types commands; output and anything the world delivers
//! to them is printed. Script ticks happen on the [`Pump`](crate::Pump)
//! thread in interactive mode, or on a simulated clock in batch mode.

use std::sync::{Arc, MutexGuard};
use std::time::{Duration, Instant};

use textspace_commands::CommandProcessor;
use textspace_foundation::{Error, Result};
use tracing::debug;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::handlers::standard_processor;
use crate::session::{Pump, Session, SharedSession};

/// Ticks allowed per batch line before moving on.
pub const BATCH_TICK_LIMIT: usize = 10_000;

/// Default interval between background ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Shared session state.
    session: SharedSession,

    /// Command dispatch.
    processor: CommandProcessor<Session>,

    /// The local player.
    user: String,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Interval between background ticks while interactive.
    tick_interval: Duration,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: SharedSession, user: &str) -> Result<Self> {
        let editor = RustylineEditor::new(Arc::clone(&session), user)?;
        Self::with_editor(editor, session, user)
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL with the given editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session lock is poisoned.
    pub fn with_editor(editor: E, session: SharedSession, user: &str) -> Result<Self> {
        let registry = Arc::clone(lock(&session)?.registry());
        Ok(Self {
            editor,
            session,
            processor: standard_processor(registry)?,
            user: user.to_string(),
            show_banner: true,
            prompt: "> ".to_string(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        })
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the background tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// The shared session.
    #[must_use]
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// The local player's name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Runs one command line and returns everything the player should see:
    /// the command's output followed by queued messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the session lock is poisoned.
    pub fn execute(&self, line: &str) -> Result<Vec<String>> {
        let mut session = lock(&self.session)?;
        let is_admin = session.is_admin(&self.user);
        let outcome = self
            .processor
            .process(&mut session, &self.user, is_admin, line);
        debug!(user = %self.user, line, outcome = ?outcome, "command processed");

        let mut out = vec![outcome.to_string()];
        out.extend(session.world_mut().drain_for(&self.user));
        Ok(out)
    }

    /// Runs lines non-interactively. After each line, scripts run on a
    /// simulated clock until they finish or [`BATCH_TICK_LIMIT`] is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the session lock is poisoned.
    pub fn run_batch<I, S>(&self, lines: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        let mut clock = Instant::now();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            out.extend(self.execute(line)?);
            let mut session = lock(&self.session)?;
            clock = session.settle(clock, BATCH_TICK_LIMIT);
            out.extend(session.world_mut().drain_for(&self.user));
            if session.wants_quit(&self.user) {
                break;
            }
        }
        Ok(out)
    }

    /// Runs the REPL loop until EOF or `quit`.
    ///
    /// Scripts tick on a background [`Pump`] which prints anything delivered
    /// to the player between commands.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails or the session lock is poisoned.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }
        for line in self.execute("look")? {
            println!("{line}");
        }

        let user = self.user.clone();
        let pump = Pump::spawn(Arc::clone(&self.session), self.tick_interval, move |session| {
            for message in session.world_mut().drain_for(&user) {
                println!("{message}");
            }
        });
        let result = self.read_loop();
        pump.stop();

        lock(&self.session)?.disconnect(&self.user);
        result
    }

    fn read_loop(&mut self) -> Result<()> {
        loop {
            let line = match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => return Ok(()),
            };
            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history(&line);

            for output in self.execute(&line)? {
                println!("{output}");
            }
            if lock(&self.session)?.wants_quit(&self.user) {
                return Ok(());
            }
        }
    }

    fn print_banner(&self) {
        println!(
            "\x1b[1mTextspace\x1b[0m {} - connected as {}",
            env!("CARGO_PKG_VERSION"),
            self.user
        );
        println!("Type 'help' for commands, Tab to complete, Ctrl+D to leave.\n");
    }
}

/// Locks the shared session.
///
/// # Errors
///
/// Returns an `Internal` error if another thread panicked while holding it.
pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, Session>> {
    session
        .lock()
        .map_err(|_| Error::internal("session lock poisoned"))
}
