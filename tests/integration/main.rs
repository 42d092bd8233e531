//! Integration tests for the full Textspace stack.
//!
//! Tests that span multiple crates:
//! - Command processing against a live world
//! - Scripted bots reacting to players
//! - Batch transcripts through the REPL
//! - Script library export and import

mod batch;
mod bots;
mod library;

use std::sync::Arc;
use std::time::Instant;

use textspace_commands::CommandProcessor;
use textspace_runtime::{RuntimeConfig, Session, standard_processor};

/// A small world: two rooms, a guide bot, a chest and a few scripts.
pub const WORLD: &str = r#"
admins = ["root"]

[engine]
rng_seed = 11

[[rooms]]
id = "lobby"
description = "A quiet lobby."
exits = { north = "garden" }

[[rooms]]
id = "garden"
description = "Roses everywhere."
exits = { south = "lobby" }

[[bots]]
name = "guide"
room = "garden"
inventory = ["map"]

[[items]]
name = "brass lamp"
room = "lobby"

[[items]]
name = "chest"
room = "lobby"
container = { open = false, contents = ["coin"] }

[[scripts]]
name = "gift"
bot = "guide"
source = """
function welcome {
  give map $user
  say Enjoy the $room, $user.
}
call welcome
"""
trigger = { event = "enter_room", room = "garden" }

[[scripts]]
name = "chime"
bot = "guide"
source = "repeat 2 { broadcast dong; wait 1 }"
"#;

/// A session plus the standard processor, driven one line at a time.
pub struct Table {
    /// The session under test.
    pub session: Session,
    processor: CommandProcessor<Session>,
    clock: Instant,
}

impl Table {
    /// Builds the world and connects the given users.
    pub fn new(users: &[&str]) -> Self {
        let config = RuntimeConfig::from_toml(WORLD).unwrap();
        let mut session = Session::new(&config).unwrap();
        for user in users {
            session.connect(user);
        }
        session.world_mut().drain_deliveries();
        let processor = standard_processor(Arc::clone(session.registry())).unwrap();
        Self {
            session,
            processor,
            clock: Instant::now(),
        }
    }

    /// Runs a line for `user` and returns what they see.
    pub fn run(&mut self, user: &str, line: &str) -> String {
        let is_admin = self.session.is_admin(user);
        self.processor
            .process(&mut self.session, user, is_admin, line)
            .to_string()
    }

    /// Lets scripts run to completion.
    pub fn settle(&mut self) {
        self.clock = self.session.settle(self.clock, 10_000);
    }

    /// Takes the messages queued for `user`.
    pub fn heard(&mut self, user: &str) -> Vec<String> {
        self.session.world_mut().drain_for(user)
    }
}
