//! Session state shared by the REPL and the scheduler pump.
//!
//! A [`Session`] owns the world, the script engine and the frozen command
//! registry. World changes that scripts care about (users arriving, leaving,
//! moving) go through the session so the matching events are dispatched.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use textspace_commands::{
    CommandRegistry, Completion, CompletionProvider, CompletionRequest, WorldSnapshot,
    stdlib::standard_registry,
};
use textspace_engine::{Engine, EventContext, InstanceId, TickReport};
use textspace_foundation::Result;
use textspace_script::EventKind;
use tracing::{debug, error, info, warn};

use crate::config::RuntimeConfig;
use crate::world::{World, WorldError};

/// World, engine and registry for one running environment.
#[derive(Debug)]
pub struct Session {
    world: World,
    engine: Engine,
    registry: Arc<CommandRegistry>,
    admins: BTreeSet<String>,
    quitting: BTreeSet<String>,
}

impl Session {
    /// Builds a session from configuration.
    ///
    /// Scripts that fail to parse are logged and skipped.
    ///
    /// # Errors
    /// Returns an error if the world description is inconsistent.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let world = World::from_config(config)?;
        let mut engine = Engine::new(config.engine.clone());
        for script in &config.scripts {
            if world.bot_exists(&script.bot) {
                let trigger = script.trigger.clone().map(Into::into);
                let loaded = engine.load_script(&script.name, &script.bot, &script.source, trigger);
                if let Err(err) = loaded {
                    warn!(script = %script.name, error = %err, "script failed to parse; skipped");
                }
            } else {
                warn!(script = %script.name, bot = %script.bot, "script owner is not a known bot; skipped");
            }
        }
        let mut session = Self::from_parts(world, engine, Arc::new(standard_registry()?));
        session.admins = config.admins.iter().cloned().collect();
        info!(
            rooms = session.world.room_ids().count(),
            scripts = session.engine.scripts().count(),
            "session ready"
        );
        Ok(session)
    }

    /// Assembles a session from existing parts.
    #[must_use]
    pub fn from_parts(world: World, engine: Engine, registry: Arc<CommandRegistry>) -> Self {
        Self {
            world,
            engine,
            registry,
            admins: BTreeSet::new(),
            quitting: BTreeSet::new(),
        }
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The script engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The script engine, mutably.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// The command registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Grants admin commands to a user.
    pub fn grant_admin(&mut self, user: &str) {
        self.admins.insert(user.to_string());
    }

    /// Returns true if the user may run admin commands.
    #[must_use]
    pub fn is_admin(&self, user: &str) -> bool {
        self.admins.contains(user)
    }

    /// Connects a user and fires `enter_room` for their start room.
    pub fn connect(&mut self, user: &str) -> Vec<InstanceId> {
        let room = self.world.connect(user);
        self.world
            .announce(&room, &format!("{user} has arrived."), Some(user));
        self.dispatch(EventKind::EnterRoom, user, &room)
    }

    /// Fires `leave_room` and disconnects a user.
    pub fn disconnect(&mut self, user: &str) {
        if let Some(room) = self.world.user_room(user).map(str::to_string) {
            self.dispatch(EventKind::LeaveRoom, user, &room);
            self.world
                .announce(&room, &format!("{user} has left."), Some(user));
        }
        self.world.disconnect(user);
        self.quitting.remove(user);
    }

    /// Moves a user, firing `leave_room` for the old room and `enter_room`
    /// for the new one.
    ///
    /// # Errors
    /// Returns an error if the user or room is unknown.
    pub fn move_user(&mut self, user: &str, room: &str) -> std::result::Result<(), WorldError> {
        let from = self.world.move_user(user, room)?;
        if from == room {
            return Ok(());
        }
        self.world
            .announce(&from, &format!("{user} leaves."), Some(user));
        self.dispatch(EventKind::LeaveRoom, user, &from);
        self.world
            .announce(room, &format!("{user} arrives."), Some(user));
        self.dispatch(EventKind::EnterRoom, user, room);
        Ok(())
    }

    /// Removes a bot, cancels every instance it owns and unloads its scripts.
    pub fn remove_bot(&mut self, bot: &str) -> bool {
        let cancelled = self.engine.cancel_owner(bot);
        let unloaded = self.engine.unload_owner(bot);
        debug!(bot, cancelled, unloaded, "bot removed");
        self.world.remove_bot(bot)
    }

    /// Marks a user as wanting to leave.
    pub fn request_quit(&mut self, user: &str) {
        self.quitting.insert(user.to_string());
    }

    /// Returns true if the user asked to quit.
    #[must_use]
    pub fn wants_quit(&self, user: &str) -> bool {
        self.quitting.contains(user)
    }

    fn dispatch(&mut self, event: EventKind, user: &str, room: &str) -> Vec<InstanceId> {
        self.engine
            .dispatch(event, room, &EventContext::new(user, room))
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// What `user` can currently see.
    #[must_use]
    pub fn snapshot(&self, user: &str) -> WorldSnapshot {
        self.world.snapshot(user)
    }

    /// Completes the text typed so far.
    #[must_use]
    pub fn complete(&self, user: &str, line: &str) -> Completion {
        let request = CompletionRequest::from_line(line, user, self.is_admin(user));
        CompletionProvider::new(&self.registry).complete(&request, &self.snapshot(user))
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Runs one scheduler tick against the world.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        self.engine.tick(now, &mut self.world)
    }

    /// Ticks on a simulated clock until no instance is alive or `max_ticks`
    /// ticks have run, jumping ahead to each wake time. Returns the final
    /// simulated time.
    pub fn settle(&mut self, start: Instant, max_ticks: usize) -> Instant {
        let mut now = start;
        for _ in 0..max_ticks {
            if self.engine.is_idle() {
                break;
            }
            if !self.engine.scheduler().has_ready() {
                match self.engine.next_wake() {
                    Some(wake) => now = now.max(wake),
                    None => break,
                }
            }
            self.tick(now);
        }
        now
    }
}

// =============================================================================
// Pump
// =============================================================================

/// A session shared between the REPL and the pump thread.
pub type SharedSession = Arc<Mutex<Session>>;

/// Background thread that ticks a shared session at a fixed interval.
pub struct Pump {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Pump {
    /// Starts the pump. `after_tick` runs under the lock after every tick.
    pub fn spawn<F>(session: SharedSession, interval: Duration, mut after_tick: F) -> Self
    where
        F: FnMut(&mut Session) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(interval);
                let Ok(mut guard) = session.lock() else {
                    error!("session lock poisoned; pump stopping");
                    break;
                };
                guard.tick(Instant::now());
                after_tick(&mut guard);
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the pump and waits for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("pump thread panicked");
            }
        }
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.shutdown();
    }
}
