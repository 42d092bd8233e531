//! Visibility scopes for completion and argument resolution.
//!
//! A [`WorldSnapshot`] is a read-only view of what one caller can currently
//! see, assembled by the host for a single request. The command layer never
//! owns world state; it only reads these lists.

use crate::command::{ArgType, DIRECTIONS};

/// A container as seen by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerView {
    /// Display name.
    pub name: String,
    /// Whether the container is currently open.
    pub open: bool,
}

impl ContainerView {
    /// Creates a container view.
    #[must_use]
    pub fn new(name: impl Into<String>, open: bool) -> Self {
        Self {
            name: name.into(),
            open,
        }
    }
}

/// What a caller can see at the moment of a request.
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    /// Items in the caller's room (including contents of open containers).
    pub room_items: Vec<String>,
    /// Items the caller carries.
    pub inventory: Vec<String>,
    /// Users the caller can address.
    pub users: Vec<String>,
    /// Bots in the caller's room.
    pub bots: Vec<String>,
    /// Containers in reach.
    pub containers: Vec<ContainerView>,
    /// Every room id in the world.
    pub rooms: Vec<String>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the room items.
    #[must_use]
    pub fn with_room_items<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.room_items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the inventory.
    #[must_use]
    pub fn with_inventory<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.inventory = items.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the addressable users.
    #[must_use]
    pub fn with_users<S: Into<String>>(mut self, users: impl IntoIterator<Item = S>) -> Self {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the bots in the room.
    #[must_use]
    pub fn with_bots<S: Into<String>>(mut self, bots: impl IntoIterator<Item = S>) -> Self {
        self.bots = bots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the containers in reach.
    #[must_use]
    pub fn with_containers(mut self, containers: impl IntoIterator<Item = ContainerView>) -> Self {
        self.containers = containers.into_iter().collect();
        self
    }

    /// Sets the room catalog.
    #[must_use]
    pub fn with_rooms<S: Into<String>>(mut self, rooms: impl IntoIterator<Item = S>) -> Self {
        self.rooms = rooms.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the names an argument of the given type may take.
    ///
    /// Duplicates are removed case-insensitively, first occurrence wins.
    /// `room` yields nothing for non-admin callers; `text` and prepositions
    /// never yield names.
    #[must_use]
    pub fn names_for(&self, arg_type: &ArgType, is_admin: bool) -> Vec<&str> {
        let names: Vec<&str> = match arg_type {
            ArgType::RoomItem => self.room_items.iter().map(String::as_str).collect(),
            ArgType::InventoryItem => self.inventory.iter().map(String::as_str).collect(),
            ArgType::Examinable => self
                .room_items
                .iter()
                .chain(&self.inventory)
                .chain(&self.users)
                .chain(&self.bots)
                .map(String::as_str)
                .collect(),
            ArgType::Openable => self.containers_where(|c| !c.open),
            ArgType::Closeable | ArgType::Container => self.containers_where(|c| c.open),
            ArgType::Direction => DIRECTIONS.to_vec(),
            ArgType::User => self.users.iter().map(String::as_str).collect(),
            ArgType::Room if is_admin => self.rooms.iter().map(String::as_str).collect(),
            ArgType::Room | ArgType::Text | ArgType::Preposition(_) => Vec::new(),
        };
        dedupe(names)
    }

    fn containers_where(&self, pred: impl Fn(&ContainerView) -> bool) -> Vec<&str> {
        self.containers
            .iter()
            .filter(|c| pred(c))
            .map(|c| c.name.as_str())
            .collect()
    }
}

fn dedupe(names: Vec<&str>) -> Vec<&str> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| {
            let key = name.to_lowercase();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        })
        .collect()
}
