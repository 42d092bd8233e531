//! Batch REPL tests.
//!
//! A transcript runs through [`Repl::run_batch`] with scripts settling on a
//! simulated clock between lines.

use std::sync::{Arc, Mutex};

use textspace_foundation::Result;
use textspace_runtime::{LineEditor, ReadResult, Repl, RuntimeConfig, Session};

use crate::WORLD;

struct NullEditor;

impl LineEditor for NullEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(ReadResult::Eof)
    }

    fn add_history(&mut self, _line: &str) {}
}

fn repl(user: &str) -> Repl<NullEditor> {
    let mut session = Session::new(&RuntimeConfig::from_toml(WORLD).unwrap()).unwrap();
    session.connect(user);
    session.world_mut().drain_deliveries();
    Repl::with_editor(NullEditor, Arc::new(Mutex::new(session)), user).unwrap()
}

#[test]
fn transcript_includes_bot_reactions() {
    let repl = repl("alice");
    let out = repl
        .run_batch([
            "# walk to the garden and back",
            "go north",
            "inventory",
            "go south",
        ])
        .unwrap();

    assert!(out[0].starts_with("== garden =="));
    assert_eq!(out[1], "guide says: *gives map to alice*");
    assert_eq!(out[2], "guide says: Enjoy the garden, alice.");
    assert_eq!(out[3], "You are carrying: map");
    assert!(out[4].starts_with("== lobby =="));
    assert_eq!(out.len(), 5);
}

#[test]
fn transcript_stops_at_quit() {
    let repl = repl("alice");
    let out = repl.run_batch(["who", "quit", "look"]).unwrap();
    assert_eq!(out, vec!["Online (1): alice", "Goodbye!"]);
}

#[test]
fn transcript_reports_errors_inline() {
    let repl = repl("alice");
    let out = repl
        .run_batch(["dance", "tell", "go west", "get brass lamp"])
        .unwrap();
    assert_eq!(
        out,
        vec![
            "Unknown command: dance",
            "Usage: tell <user> <message>",
            "You can't go west from here.",
            "You take brass lamp.",
        ]
    );
}
