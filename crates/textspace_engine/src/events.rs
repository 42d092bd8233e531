//! World events and the trigger table.
//!
//! Scripts register a [`Trigger`] at load time. When the host reports an
//! event, the table yields the names of matching scripts: those bound to the
//! event's room first, then those bound to any room.

use std::collections::HashMap;

use textspace_script::{Bindings, EventKind, Trigger};

/// Who and where an event happened; becomes the launched instances' initial
/// variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventContext {
    bindings: Bindings,
}

impl EventContext {
    /// Context for a user acting in a room.
    #[must_use]
    pub fn new(user: impl Into<String>, room: impl Into<String>) -> Self {
        Self::default().with_var("user", user).with_var("room", room)
    }

    /// Adds a binding.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Reads a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    /// The bindings, cheaply cloned.
    #[must_use]
    pub fn bindings(&self) -> Bindings {
        self.bindings.clone()
    }
}

/// Maps `(event, room)` and `(event, any room)` to script names.
#[derive(Clone, Debug, Default)]
pub struct TriggerTable {
    by_room: HashMap<(EventKind, String), Vec<String>>,
    any_room: HashMap<EventKind, Vec<String>>,
}

impl TriggerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a script to a trigger. Registering the same pair twice is a no-op.
    pub fn register(&mut self, script: &str, trigger: &Trigger) {
        let list = match &trigger.room {
            Some(room) => self
                .by_room
                .entry((trigger.event, room.clone()))
                .or_default(),
            None => self.any_room.entry(trigger.event).or_default(),
        };
        if !list.iter().any(|s| s == script) {
            list.push(script.to_string());
        }
    }

    /// Removes every binding of a script.
    pub fn unregister(&mut self, script: &str) {
        for list in self.by_room.values_mut().chain(self.any_room.values_mut()) {
            list.retain(|s| s != script);
        }
        self.by_room.retain(|_, list| !list.is_empty());
        self.any_room.retain(|_, list| !list.is_empty());
    }

    /// Scripts to launch for an event: room-specific first, then wildcard,
    /// each in registration order.
    #[must_use]
    pub fn matching(&self, event: EventKind, room: &str) -> Vec<&str> {
        let specific = self
            .by_room
            .get(&(event, room.to_string()))
            .into_iter()
            .flatten();
        let wildcard = self.any_room.get(&event).into_iter().flatten();
        specific.chain(wildcard).map(String::as_str).collect()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_room.values().chain(self.any_room.values()).map(Vec::len).sum()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
