//! The script engine facade.
//!
//! Bundles the script library, the trigger table and the scheduler:
//!
//! ```text
//! load_script ──► library + triggers
//!
//! dispatch(event, room) ──► triggers ──► spawn ──┐
//! run_script(name)      ───────────────► spawn ──┤
//!                                                ▼
//! tick(now, host) ◄──────────────────────── scheduler
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use textspace_foundation::{Error, Result};
use textspace_script::{EventKind, Instance, Script, ScriptHost, Trigger};
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::events::{EventContext, TriggerTable};
use crate::scheduler::{InstanceId, Scheduler, TickReport};

/// Script library, triggers and scheduler in one place.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    scripts: BTreeMap<String, Arc<Script>>,
    triggers: TriggerTable,
    scheduler: Scheduler,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine with no scripts.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let scheduler = Scheduler::new(&config);
        Self {
            config,
            scripts: BTreeMap::new(),
            triggers: TriggerTable::new(),
            scheduler,
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Script library
    // =========================================================================

    /// Adds a parsed script, replacing any script of the same name.
    pub fn add_script(&mut self, script: Script) {
        self.triggers.unregister(&script.name);
        if let Some(trigger) = &script.trigger {
            self.triggers.register(&script.name, trigger);
        }
        info!(script = %script.name, bot = %script.bot, "script loaded");
        self.scripts.insert(script.name.clone(), Arc::new(script));
    }

    /// Parses and adds a script.
    ///
    /// # Errors
    /// Returns the `Syntax` error if the source is malformed; the script is
    /// not registered and any previous script of that name stays in place.
    pub fn load_script(
        &mut self,
        name: &str,
        bot: &str,
        source: &str,
        trigger: Option<Trigger>,
    ) -> Result<()> {
        match Script::load(name, bot, source, trigger) {
            Ok(script) => {
                self.add_script(script);
                Ok(())
            }
            Err(err) => {
                error!(script = name, bot, error = %err, "script rejected");
                Err(err)
            }
        }
    }

    /// Removes a script and its trigger. Running instances are unaffected.
    pub fn unload_script(&mut self, name: &str) -> bool {
        self.triggers.unregister(name);
        self.scripts.remove(name).is_some()
    }

    /// Removes every script owned by a bot, with their triggers. Returns how
    /// many were removed.
    pub fn unload_owner(&mut self, bot: &str) -> usize {
        let owned: Vec<String> = self
            .scripts
            .values()
            .filter(|s| s.bot == bot)
            .map(|s| s.name.clone())
            .collect();
        owned.iter().filter(|name| self.unload_script(name)).count()
    }

    /// Looks up a script.
    #[must_use]
    pub fn script(&self, name: &str) -> Option<&Arc<Script>> {
        self.scripts.get(name)
    }

    /// All scripts, sorted by name.
    pub fn scripts(&self) -> impl Iterator<Item = &Arc<Script>> {
        self.scripts.values()
    }

    /// The trigger table.
    #[must_use]
    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    // =========================================================================
    // Launching
    // =========================================================================

    /// Launches a script by name, as the admin `script` command does.
    ///
    /// # Errors
    /// Returns a `Config` error if no script has that name.
    pub fn run_script(&mut self, name: &str, context: &EventContext) -> Result<InstanceId> {
        let Some(script) = self.scripts.get(name) else {
            return Err(Error::config(format!("unknown script: {name}")));
        };
        let instance = Instance::new(
            script.name.clone(),
            script.bot.clone(),
            &script.program,
            context.bindings(),
        );
        Ok(self.scheduler.spawn(instance))
    }

    /// Launches a fresh instance of every script triggered by the event.
    ///
    /// Returns immediately; the instances run on later ticks.
    pub fn dispatch(
        &mut self,
        event: EventKind,
        room: &str,
        context: &EventContext,
    ) -> Vec<InstanceId> {
        let context = context
            .clone()
            .with_var("room", room)
            .with_var("event", event.as_str());
        let bindings = context.bindings();

        let mut launched = Vec::new();
        for name in self.triggers.matching(event, room) {
            let Some(script) = self.scripts.get(name) else {
                continue;
            };
            let instance = Instance::new(
                script.name.clone(),
                script.bot.clone(),
                &script.program,
                bindings.clone(),
            );
            launched.push(self.scheduler.spawn(instance));
        }
        debug!(event = %event, room, launched = launched.len(), "event dispatched");
        launched
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Cancels one instance.
    pub fn cancel(&mut self, id: InstanceId) -> bool {
        self.scheduler.cancel(id)
    }

    /// Cancels every instance of a bot, e.g. when the bot is removed.
    pub fn cancel_owner(&mut self, bot: &str) -> usize {
        self.scheduler.cancel_owner(bot)
    }

    /// Runs one scheduling tick.
    pub fn tick(&mut self, now: Instant, host: &mut dyn ScriptHost) -> TickReport {
        self.scheduler.tick(now, host)
    }

    /// Earliest wake time of a sleeping instance.
    #[must_use]
    pub fn next_wake(&self) -> Option<Instant> {
        self.scheduler.next_wake()
    }

    /// Returns true if no instances are alive.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
