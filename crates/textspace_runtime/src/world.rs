//! In-memory world used by the runtime.
//!
//! Rooms, users, bots and items live here. The world implements
//! [`ScriptHost`] so scripts act on it directly, and builds the per-caller
//! [`WorldSnapshot`] the command layer completes and resolves against.
//! Messages are queued per recipient until the front end drains them.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use textspace_commands::{ContainerView, HandlerError, WorldSnapshot};
use textspace_foundation::Error;
use textspace_script::{HostError, ScriptHost};
use thiserror::Error as ThisError;

use crate::config::RuntimeConfig;

// =============================================================================
// WorldError
// =============================================================================

/// Failure of a world operation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum WorldError {
    /// No such room.
    #[error("unknown room: {0}")]
    UnknownRoom(String),
    /// No such user.
    #[error("unknown user: {0}")]
    UnknownUser(String),
    /// No such bot.
    #[error("unknown bot: {0}")]
    UnknownBot(String),
    /// The item is not where it was expected.
    #[error("{holder} does not have {item}")]
    MissingItem {
        /// Item name.
        item: String,
        /// Expected holder.
        holder: String,
    },
    /// No exit that way.
    #[error("You can't go {0} from here.")]
    NoExit(String),
    /// The item is not a container.
    #[error("{0} is not a container")]
    NotAContainer(String),
    /// The container is already in the requested state.
    #[error("{name} is already {state}")]
    AlreadyInState {
        /// Container name.
        name: String,
        /// `open` or `closed`.
        state: &'static str,
    },
    /// The container is closed.
    #[error("{0} is closed")]
    Closed(String),
}

impl From<WorldError> for HostError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::UnknownRoom(room) => Self::UnknownRoom(room),
            WorldError::UnknownUser(user) => Self::UnknownUser(user),
            WorldError::UnknownBot(bot) => Self::UnknownBot(bot),
            WorldError::MissingItem { item, holder } => Self::MissingItem { item, holder },
            other => Self::Rejected(other.to_string()),
        }
    }
}

impl From<WorldError> for HandlerError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::UnknownRoom(name)
            | WorldError::UnknownUser(name)
            | WorldError::UnknownBot(name) => Self::NotFound(name),
            WorldError::MissingItem { item, .. } => Self::NotFound(item),
            other => Self::Failed(other.to_string()),
        }
    }
}

// =============================================================================
// World
// =============================================================================

/// A message waiting for its recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient user.
    pub to: String,
    /// Message text.
    pub text: String,
}

#[derive(Clone, Debug, Default)]
struct Room {
    description: String,
    exits: BTreeMap<String, String>,
    items: Vec<String>,
}

#[derive(Clone, Debug)]
struct Occupant {
    room: String,
    inventory: Vec<String>,
}

impl Occupant {
    fn new(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            inventory: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Container {
    open: bool,
    contents: Vec<String>,
}

/// Rooms, occupants and items.
#[derive(Clone, Debug)]
pub struct World {
    start_room: String,
    rooms: BTreeMap<String, Room>,
    users: BTreeMap<String, Occupant>,
    bots: BTreeMap<String, Occupant>,
    containers: BTreeMap<String, Container>,
    outbox: Vec<Delivery>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ROOM)
    }
}

impl World {
    /// Creates a world holding only the start room.
    #[must_use]
    pub fn new(start_room: impl Into<String>) -> Self {
        let start_room = start_room.into();
        let mut rooms = BTreeMap::new();
        rooms.insert(start_room.clone(), Room::default());
        Self {
            start_room,
            rooms,
            users: BTreeMap::new(),
            bots: BTreeMap::new(),
            containers: BTreeMap::new(),
            outbox: Vec::new(),
        }
    }

    /// Builds the world described by a configuration.
    ///
    /// # Errors
    /// Returns a `Config` error if an exit, bot or item refers to a room
    /// that is not defined.
    pub fn from_config(config: &RuntimeConfig) -> textspace_foundation::Result<Self> {
        let mut world = Self::new(config.start_room());
        for room in &config.rooms {
            world.add_room(&room.id, &room.description);
        }
        for room in &config.rooms {
            for (direction, target) in &room.exits {
                world
                    .add_exit(&room.id, direction, target)
                    .map_err(|e| Error::config(format!("room {}: {e}", room.id)))?;
            }
        }
        for bot in &config.bots {
            world
                .add_bot(&bot.name, &bot.room)
                .map_err(|e| Error::config(format!("bot {}: {e}", bot.name)))?;
            if let Some(holder) = world.bots.get_mut(&bot.name) {
                holder.inventory.extend(bot.inventory.iter().cloned());
            }
        }
        for item in &config.items {
            let placed = match &item.container {
                Some(container) => world.add_container(
                    &item.name,
                    &item.room,
                    container.open,
                    container.contents.iter().cloned(),
                ),
                None => world.place_item(&item.name, &item.room),
            };
            placed.map_err(|e| Error::config(format!("item {}: {e}", item.name)))?;
        }
        Ok(world)
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Adds a room, or updates its description if it exists.
    pub fn add_room(&mut self, id: &str, description: &str) {
        self.rooms.entry(id.to_string()).or_default().description = description.to_string();
    }

    /// Adds a one-way exit.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownRoom`] if either room is missing.
    pub fn add_exit(&mut self, from: &str, direction: &str, to: &str) -> Result<(), WorldError> {
        if !self.rooms.contains_key(to) {
            return Err(WorldError::UnknownRoom(to.to_string()));
        }
        self.room_mut(from)?
            .exits
            .insert(direction.to_lowercase(), to.to_string());
        Ok(())
    }

    /// Places an item on the floor of a room.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownRoom`] if the room is missing.
    pub fn place_item(&mut self, item: &str, room: &str) -> Result<(), WorldError> {
        self.room_mut(room)?.items.push(item.to_string());
        Ok(())
    }

    /// Places a container in a room.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownRoom`] if the room is missing.
    pub fn add_container(
        &mut self,
        name: &str,
        room: &str,
        open: bool,
        contents: impl IntoIterator<Item = String>,
    ) -> Result<(), WorldError> {
        self.place_item(name, room)?;
        self.containers.insert(
            name.to_string(),
            Container {
                open,
                contents: contents.into_iter().collect(),
            },
        );
        Ok(())
    }

    /// Adds a bot to a room.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownRoom`] if the room is missing.
    pub fn add_bot(&mut self, name: &str, room: &str) -> Result<(), WorldError> {
        self.require_room(room)?;
        self.bots.insert(name.to_string(), Occupant::new(room));
        Ok(())
    }

    /// Removes a bot. Returns false if there was no such bot.
    pub fn remove_bot(&mut self, name: &str) -> bool {
        self.bots.remove(name).is_some()
    }

    /// Connects a user in the start room. Reconnecting keeps their state.
    ///
    /// Returns the room the user is in.
    pub fn connect(&mut self, user: &str) -> String {
        self.users
            .entry(user.to_string())
            .or_insert_with(|| Occupant::new(self.start_room.clone()))
            .room
            .clone()
    }

    /// Disconnects a user, dropping undelivered messages.
    pub fn disconnect(&mut self, user: &str) -> bool {
        self.outbox.retain(|d| d.to != user);
        self.users.remove(user).is_some()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Room new users start in.
    #[must_use]
    pub fn start_room(&self) -> &str {
        &self.start_room
    }

    /// Room ids, sorted.
    pub fn room_ids(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }

    /// Connected users, sorted.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Room a user is in.
    #[must_use]
    pub fn user_room(&self, user: &str) -> Option<&str> {
        self.users.get(user).map(|u| u.room.as_str())
    }

    /// Items a user or bot carries.
    #[must_use]
    pub fn inventory(&self, holder: &str) -> Option<&[String]> {
        self.users
            .get(holder)
            .or_else(|| self.bots.get(holder))
            .map(|o| o.inventory.as_slice())
    }

    /// Destination of an exit.
    #[must_use]
    pub fn exit(&self, room: &str, direction: &str) -> Option<&str> {
        self.rooms
            .get(room)?
            .exits
            .get(&direction.to_lowercase())
            .map(String::as_str)
    }

    /// Returns true if the bot exists.
    #[must_use]
    pub fn bot_exists(&self, bot: &str) -> bool {
        self.bots.contains_key(bot)
    }

    /// Returns true if the room exists.
    #[must_use]
    pub fn has_room(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    /// Users in a room.
    #[must_use]
    pub fn users_in(&self, room: &str) -> Vec<&str> {
        occupants_in(&self.users, room)
    }

    /// Bots in a room.
    #[must_use]
    pub fn bots_in(&self, room: &str) -> Vec<&str> {
        occupants_in(&self.bots, room)
    }

    /// Text shown by `look` in a room.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownRoom`] if the room is missing.
    pub fn describe_room(&self, room: &str, viewer: &str) -> Result<String, WorldError> {
        let data = self.room(room)?;
        let mut out = format!("== {room} ==");
        if !data.description.is_empty() {
            let _ = write!(out, "\n{}", data.description);
        }
        if !data.exits.is_empty() {
            let exits: Vec<&str> = data.exits.keys().map(String::as_str).collect();
            let _ = write!(out, "\nExits: {}", exits.join(", "));
        }
        if !data.items.is_empty() {
            let items: Vec<String> = data.items.iter().map(|i| self.item_label(i)).collect();
            let _ = write!(out, "\nYou see: {}", items.join(", "));
        }
        let others: Vec<&str> = self
            .users_in(room)
            .into_iter()
            .filter(|u| *u != viewer)
            .chain(self.bots_in(room))
            .collect();
        if !others.is_empty() {
            let _ = write!(out, "\nPresent: {}", others.join(", "));
        }
        Ok(out)
    }

    /// Text shown by `examine`.
    #[must_use]
    pub fn describe_thing(&self, name: &str) -> String {
        if let Some(container) = self.containers.get(name) {
            if !container.open {
                return format!("{name} is closed.");
            }
            if container.contents.is_empty() {
                return format!("{name} is open and empty.");
            }
            return format!("{name} is open. Inside: {}", container.contents.join(", "));
        }
        if let Some(user) = self.users.get(name) {
            return format!("{name} is a visitor in {}.", user.room);
        }
        if self.bots.contains_key(name) {
            return format!("{name} is a bot.");
        }
        format!("You see nothing special about {name}.")
    }

    fn item_label(&self, item: &str) -> String {
        match self.containers.get(item) {
            Some(c) if c.open => format!("{item} (open)"),
            Some(_) => format!("{item} (closed)"),
            None => item.to_string(),
        }
    }

    /// What `user` can see and reach, for completion and argument resolution.
    #[must_use]
    pub fn snapshot(&self, user: &str) -> WorldSnapshot {
        let Some(occupant) = self.users.get(user) else {
            return WorldSnapshot::new().with_rooms(self.room_ids());
        };
        let room_items = self
            .rooms
            .get(&occupant.room)
            .map(|r| r.items.as_slice())
            .unwrap_or_default();

        let mut visible: Vec<&str> = room_items.iter().map(String::as_str).collect();
        for item in room_items {
            if let Some(c) = self.containers.get(item).filter(|c| c.open) {
                visible.extend(c.contents.iter().map(String::as_str));
            }
        }
        let containers = room_items
            .iter()
            .chain(&occupant.inventory)
            .filter_map(|item| {
                self.containers
                    .get(item)
                    .map(|c| ContainerView::new(item.clone(), c.open))
            });

        WorldSnapshot::new()
            .with_room_items(visible)
            .with_inventory(occupant.inventory.iter().map(String::as_str))
            .with_users(self.users().filter(|u| *u != user))
            .with_bots(self.bots_in(&occupant.room))
            .with_containers(containers)
            .with_rooms(self.room_ids())
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Moves a user to a room. Returns the room they left.
    ///
    /// # Errors
    /// Returns an error if the user or room is unknown.
    pub fn move_user(&mut self, user: &str, room: &str) -> Result<String, WorldError> {
        self.require_room(room)?;
        let occupant = self
            .users
            .get_mut(user)
            .ok_or_else(|| WorldError::UnknownUser(user.to_string()))?;
        Ok(std::mem::replace(&mut occupant.room, room.to_string()))
    }

    /// Picks an item up from the floor or from an open container.
    ///
    /// # Errors
    /// Returns [`WorldError::MissingItem`] if it is not within reach.
    pub fn pick_up(&mut self, user: &str, item: &str) -> Result<(), WorldError> {
        let room = self.user_room_owned(user)?;
        let floor = &mut self
            .rooms
            .get_mut(&room)
            .ok_or_else(|| WorldError::UnknownRoom(room.clone()))?
            .items;
        let taken = if remove_item(floor, item) {
            true
        } else {
            let open: Vec<String> = floor
                .iter()
                .filter(|i| self.containers.get(*i).is_some_and(|c| c.open))
                .cloned()
                .collect();
            open.iter().any(|name| {
                self.containers
                    .get_mut(name)
                    .is_some_and(|c| remove_item(&mut c.contents, item))
            })
        };
        if !taken {
            return Err(WorldError::MissingItem {
                item: item.to_string(),
                holder: room,
            });
        }
        self.holder_mut(user)?.inventory.push(item.to_string());
        Ok(())
    }

    /// Drops a carried item on the floor.
    ///
    /// # Errors
    /// Returns [`WorldError::MissingItem`] if the user does not carry it.
    pub fn drop_item(&mut self, user: &str, item: &str) -> Result<(), WorldError> {
        let room = self.user_room_owned(user)?;
        self.remove_from_holder(user, item)?;
        self.room_mut(&room)?.items.push(item.to_string());
        Ok(())
    }

    /// Opens or closes a container in reach.
    ///
    /// # Errors
    /// Returns an error if it is not a container or already in that state.
    pub fn set_open(&mut self, name: &str, open: bool) -> Result<(), WorldError> {
        let container = self
            .containers
            .get_mut(name)
            .ok_or_else(|| WorldError::NotAContainer(name.to_string()))?;
        if container.open == open {
            return Err(WorldError::AlreadyInState {
                name: name.to_string(),
                state: if open { "open" } else { "closed" },
            });
        }
        container.open = open;
        Ok(())
    }

    /// Puts a carried item into an open container.
    ///
    /// # Errors
    /// Returns an error if the item is not carried or the container is closed.
    pub fn put_in(&mut self, user: &str, item: &str, container: &str) -> Result<(), WorldError> {
        match self.containers.get(container) {
            None => return Err(WorldError::NotAContainer(container.to_string())),
            Some(c) if !c.open => return Err(WorldError::Closed(container.to_string())),
            Some(_) => {}
        }
        self.remove_from_holder(user, item)?;
        if let Some(c) = self.containers.get_mut(container) {
            c.contents.push(item.to_string());
        }
        Ok(())
    }

    /// Moves a carried item between two users or bots.
    ///
    /// # Errors
    /// Returns an error if either party is unknown or `from` lacks the item.
    pub fn transfer(&mut self, item: &str, from: &str, to: &str) -> Result<(), WorldError> {
        self.holder_mut(to)?;
        self.remove_from_holder(from, item)?;
        self.holder_mut(to)?.inventory.push(item.to_string());
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Queues a message for one user.
    pub fn deliver(&mut self, to: &str, text: impl Into<String>) {
        self.outbox.push(Delivery {
            to: to.to_string(),
            text: text.into(),
        });
    }

    /// Queues a message for everyone in a room except `exclude`.
    pub fn announce(&mut self, room: &str, text: &str, exclude: Option<&str>) {
        let recipients: Vec<String> = self
            .users_in(room)
            .into_iter()
            .filter(|u| Some(*u) != exclude)
            .map(str::to_string)
            .collect();
        for user in recipients {
            self.deliver(&user, text);
        }
    }

    /// Takes every queued message.
    pub fn drain_deliveries(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.outbox)
    }

    /// Takes the queued messages for one user.
    pub fn drain_for(&mut self, user: &str) -> Vec<String> {
        let (mine, rest): (Vec<Delivery>, Vec<Delivery>) =
            std::mem::take(&mut self.outbox).into_iter().partition(|d| d.to == user);
        self.outbox = rest;
        mine.into_iter().map(|d| d.text).collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn room(&self, id: &str) -> Result<&Room, WorldError> {
        self.rooms
            .get(id)
            .ok_or_else(|| WorldError::UnknownRoom(id.to_string()))
    }

    fn room_mut(&mut self, id: &str) -> Result<&mut Room, WorldError> {
        self.rooms
            .get_mut(id)
            .ok_or_else(|| WorldError::UnknownRoom(id.to_string()))
    }

    fn require_room(&self, id: &str) -> Result<(), WorldError> {
        self.room(id).map(|_| ())
    }

    fn user_room_owned(&self, user: &str) -> Result<String, WorldError> {
        self.user_room(user)
            .map(str::to_string)
            .ok_or_else(|| WorldError::UnknownUser(user.to_string()))
    }

    fn holder_mut(&mut self, name: &str) -> Result<&mut Occupant, WorldError> {
        if self.users.contains_key(name) {
            return self
                .users
                .get_mut(name)
                .ok_or_else(|| WorldError::UnknownUser(name.to_string()));
        }
        self.bots
            .get_mut(name)
            .ok_or_else(|| WorldError::UnknownUser(name.to_string()))
    }

    fn remove_from_holder(&mut self, holder: &str, item: &str) -> Result<(), WorldError> {
        let occupant = self.holder_mut(holder)?;
        if remove_item(&mut occupant.inventory, item) {
            Ok(())
        } else {
            Err(WorldError::MissingItem {
                item: item.to_string(),
                holder: holder.to_string(),
            })
        }
    }
}

fn occupants_in<'a>(map: &'a BTreeMap<String, Occupant>, room: &str) -> Vec<&'a str> {
    map.iter()
        .filter(|(_, o)| o.room == room)
        .map(|(name, _)| name.as_str())
        .collect()
}

fn remove_item(items: &mut Vec<String>, item: &str) -> bool {
    match items.iter().position(|i| i == item) {
        Some(pos) => {
            items.remove(pos);
            true
        }
        None => false,
    }
}

// =============================================================================
// ScriptHost
// =============================================================================

impl ScriptHost for World {
    fn bot_room(&self, bot: &str) -> Option<String> {
        self.bots.get(bot).map(|b| b.room.clone())
    }

    fn say(&mut self, room: &str, speaker: &str, text: &str) -> Result<(), HostError> {
        self.require_room(room)?;
        self.announce(room, &format!("{speaker} says: {text}"), None);
        Ok(())
    }

    fn broadcast(&mut self, speaker: &str, text: &str) -> Result<(), HostError> {
        let message = format!("[{speaker}] {text}");
        let users: Vec<String> = self.users.keys().cloned().collect();
        for user in users {
            self.deliver(&user, message.clone());
        }
        Ok(())
    }

    fn move_bot(&mut self, bot: &str, room: &str) -> Result<(), HostError> {
        self.require_room(room)?;
        let occupant = self
            .bots
            .get_mut(bot)
            .ok_or_else(|| WorldError::UnknownBot(bot.to_string()))?;
        let old = std::mem::replace(&mut occupant.room, room.to_string());
        if old != room {
            self.announce(&old, &format!("{bot} leaves the room."), None);
            self.announce(room, &format!("{bot} enters the room."), None);
        }
        Ok(())
    }

    fn give_item(&mut self, item: &str, from: &str, to: &str) -> Result<(), HostError> {
        if !self.users.contains_key(to) {
            return Err(HostError::UnknownUser(to.to_string()));
        }
        self.transfer(item, from, to)?;
        if let Some(room) = self.bot_room(from) {
            self.say(&room, from, &format!("*gives {item} to {to}*"))?;
        }
        Ok(())
    }

    fn take_item(&mut self, item: &str, from: &str, to: &str) -> Result<(), HostError> {
        if !self.users.contains_key(from) {
            return Err(HostError::UnknownUser(from.to_string()));
        }
        self.transfer(item, from, to)?;
        if let Some(room) = self.bot_room(to) {
            self.say(&room, to, &format!("*takes {item} from {from}*"))?;
        }
        Ok(())
    }
}
