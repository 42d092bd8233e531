//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! log = "info,textspace_engine=debug"
//! admins = ["root"]
//!
//! [engine]
//! max_call_depth = 32
//!
//! [[rooms]]
//! id = "lobby"
//! description = "A quiet lobby."
//! exits = { north = "garden" }
//!
//! [[bots]]
//! name = "guide"
//! room = "lobby"
//!
//! [[items]]
//! name = "lantern"
//! room = "lobby"
//!
//! [[scripts]]
//! name = "greeter"
//! bot = "guide"
//! source = "say Welcome, $user!"
//! trigger = { event = "enter_room", room = "lobby" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use textspace_engine::EngineConfig;
use textspace_foundation::{Error, Result};
use textspace_script::{EventKind, Trigger};

/// Room every new user starts in when no rooms are configured.
pub const DEFAULT_ROOM: &str = "lobby";

/// Top-level runtime configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log: String,
    /// Users granted admin commands.
    pub admins: Vec<String>,
    /// Scheduler settings.
    pub engine: EngineConfig,
    /// Rooms; the first one is where users start.
    pub rooms: Vec<RoomConfig>,
    /// Bots and their starting rooms.
    pub bots: Vec<BotConfig>,
    /// Items placed in rooms.
    pub items: Vec<ItemConfig>,
    /// Scripts loaded at start-up.
    pub scripts: Vec<ScriptConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log: "info".to_string(),
            admins: Vec::new(),
            engine: EngineConfig::default(),
            rooms: Vec::new(),
            bots: Vec::new(),
            items: Vec::new(),
            scripts: Vec::new(),
        }
    }
}

/// A room definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Room id.
    pub id: String,
    /// Text shown by `look`.
    pub description: String,
    /// Direction to destination room id.
    pub exits: BTreeMap<String, String>,
}

/// A bot definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot name.
    pub name: String,
    /// Starting room.
    pub room: String,
    /// Items the bot carries.
    #[serde(default)]
    pub inventory: Vec<String>,
}

/// An item definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConfig {
    /// Item name.
    pub name: String,
    /// Room the item lies in.
    pub room: String,
    /// Present if the item is a container.
    #[serde(default)]
    pub container: Option<ContainerConfig>,
}

/// Container state for an item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Whether it starts open.
    pub open: bool,
    /// Items initially inside.
    pub contents: Vec<String>,
}

/// A script definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Unique script name.
    pub name: String,
    /// Owning bot.
    pub bot: String,
    /// Script source.
    pub source: String,
    /// Automatic launch condition.
    #[serde(default)]
    pub trigger: Option<TriggerConfig>,
}

/// A trigger as written in the config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Event type.
    pub event: EventKind,
    /// Room filter; omitted means any room.
    #[serde(default)]
    pub room: Option<String>,
}

impl From<TriggerConfig> for Trigger {
    fn from(config: TriggerConfig) -> Self {
        Self {
            event: config.event,
            room: config.room,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    /// Returns a `Config` error if the text is not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Loads a configuration file. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an `Io` error if the file exists but cannot be read, or a
    /// `Config` error if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)
                .map_err(|e| Error::config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Id of the room new users start in.
    #[must_use]
    pub fn start_room(&self) -> &str {
        self.rooms.first().map_or(DEFAULT_ROOM, |room| room.id.as_str())
    }

    /// Returns true if `user` may run admin commands.
    #[must_use]
    pub fn is_admin(&self, user: &str) -> bool {
        self.admins.iter().any(|admin| admin == user)
    }
}
