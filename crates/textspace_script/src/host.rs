//! Host integration for script execution.
//!
//! The interpreter never owns world state. Every observable effect goes
//! through a [`ScriptHost`], and the bot's location is re-read from the host
//! for every instruction that needs it, since the world may change while an
//! instance is suspended.

use thiserror::Error;

// =============================================================================
// HostError
// =============================================================================

/// Failure reported by a host callback.
///
/// Callback failures are never fatal to a script; the interpreter logs them
/// and moves on to the next instruction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HostError {
    /// No such room.
    #[error("unknown room: {0}")]
    UnknownRoom(String),
    /// No such user.
    #[error("unknown user: {0}")]
    UnknownUser(String),
    /// No such bot.
    #[error("unknown bot: {0}")]
    UnknownBot(String),
    /// The holder does not have the item.
    #[error("{holder} does not have {item}")]
    MissingItem {
        /// Item id.
        item: String,
        /// Who was expected to hold it.
        holder: String,
    },
    /// The host refused for another reason.
    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// ScriptHost Trait
// =============================================================================

/// World operations available to scripts.
pub trait ScriptHost {
    /// Returns the room a bot is currently in.
    fn bot_room(&self, bot: &str) -> Option<String>;

    /// Delivers `text`, spoken by `speaker`, to everyone in `room`.
    ///
    /// # Errors
    /// Returns a [`HostError`] if the message cannot be delivered.
    fn say(&mut self, room: &str, speaker: &str, text: &str) -> Result<(), HostError>;

    /// Delivers `text` to every connected user.
    ///
    /// # Errors
    /// Returns a [`HostError`] if the message cannot be delivered.
    fn broadcast(&mut self, speaker: &str, text: &str) -> Result<(), HostError>;

    /// Moves a bot to another room.
    ///
    /// # Errors
    /// Returns a [`HostError`] if the bot or room is unknown.
    fn move_bot(&mut self, bot: &str, room: &str) -> Result<(), HostError>;

    /// Moves an item from `from` to `to` on behalf of a bot handing it out.
    ///
    /// # Errors
    /// Returns a [`HostError`] if either party or the item is missing.
    fn give_item(&mut self, item: &str, from: &str, to: &str) -> Result<(), HostError>;

    /// Moves an item from `from` to `to` on behalf of a bot collecting it.
    ///
    /// # Errors
    /// Returns a [`HostError`] if either party or the item is missing.
    fn take_item(&mut self, item: &str, from: &str, to: &str) -> Result<(), HostError>;
}

// =============================================================================
// RecordingHost
// =============================================================================

/// An observable effect performed through a [`RecordingHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// `say` delivered to a room.
    Say {
        /// Room.
        room: String,
        /// Speaker.
        speaker: String,
        /// Message.
        text: String,
    },
    /// Global broadcast.
    Broadcast {
        /// Speaker.
        speaker: String,
        /// Message.
        text: String,
    },
    /// Bot moved.
    Move {
        /// Bot.
        bot: String,
        /// Destination.
        room: String,
    },
    /// Item handed out.
    Give {
        /// Item.
        item: String,
        /// Giver.
        from: String,
        /// Receiver.
        to: String,
    },
    /// Item collected.
    Take {
        /// Item.
        item: String,
        /// Previous holder.
        from: String,
        /// Collector.
        to: String,
    },
}

/// A host that places every bot in a fixed room and records effects.
///
/// Useful for embedding scripts where effects are inspected afterwards.
#[derive(Clone, Debug, Default)]
pub struct RecordingHost {
    /// Bot -> room.
    rooms: std::collections::HashMap<String, String>,
    /// Users that exist; item transfers to anyone else fail.
    users: Vec<String>,
    /// Effects in the order they happened.
    pub effects: Vec<Effect>,
}

impl RecordingHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a bot in a room.
    #[must_use]
    pub fn with_bot(mut self, bot: impl Into<String>, room: impl Into<String>) -> Self {
        self.rooms.insert(bot.into(), room.into());
        self
    }

    /// Adds a known user.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.users.push(user.into());
        self
    }

    /// Texts of every `say` so far.
    #[must_use]
    pub fn said(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Say { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn check_party(&self, name: &str) -> Result<(), HostError> {
        if self.rooms.contains_key(name) || self.users.iter().any(|u| u == name) {
            Ok(())
        } else {
            Err(HostError::UnknownUser(name.to_string()))
        }
    }
}

impl ScriptHost for RecordingHost {
    fn bot_room(&self, bot: &str) -> Option<String> {
        self.rooms.get(bot).cloned()
    }

    fn say(&mut self, room: &str, speaker: &str, text: &str) -> Result<(), HostError> {
        self.effects.push(Effect::Say {
            room: room.to_string(),
            speaker: speaker.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn broadcast(&mut self, speaker: &str, text: &str) -> Result<(), HostError> {
        self.effects.push(Effect::Broadcast {
            speaker: speaker.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn move_bot(&mut self, bot: &str, room: &str) -> Result<(), HostError> {
        let Some(current) = self.rooms.get_mut(bot) else {
            return Err(HostError::UnknownBot(bot.to_string()));
        };
        *current = room.to_string();
        self.effects.push(Effect::Move {
            bot: bot.to_string(),
            room: room.to_string(),
        });
        Ok(())
    }

    fn give_item(&mut self, item: &str, from: &str, to: &str) -> Result<(), HostError> {
        self.check_party(to)?;
        self.effects.push(Effect::Give {
            item: item.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }

    fn take_item(&mut self, item: &str, from: &str, to: &str) -> Result<(), HostError> {
        self.check_party(from)?;
        self.effects.push(Effect::Take {
            item: item.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }
}
