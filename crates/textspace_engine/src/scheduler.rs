//! Cooperative scheduler for script instances.
//!
//! Ready instances sit in a FIFO run queue; sleeping instances sit in a
//! wait queue ordered by wake time. Each [`Scheduler::tick`]:
//! 1. Moves every instance whose wake time has passed to the run queue
//! 2. Gives each ready instance one turn, round-robin, for up to
//!    `max_passes_per_tick` passes
//! 3. Retires instances that finished or failed
//!
//! The scheduler never reads the clock itself; the host passes `now` in.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::fmt;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use textspace_foundation::{Error, ErrorContext, RuntimeError};
use textspace_script::{Instance, Limits, ScriptHost, TurnOutcome};
use tracing::{debug, warn};

use crate::config::EngineConfig;

// =============================================================================
// InstanceId
// =============================================================================

/// Identifies a running instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// TickReport
// =============================================================================

/// What happened during one tick.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Turns executed.
    pub turns: usize,
    /// Instances that ran to completion.
    pub completed: Vec<InstanceId>,
    /// Instances terminated by a runtime error.
    pub failed: Vec<(InstanceId, Error)>,
}

impl TickReport {
    /// Returns true if nothing ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns == 0
    }
}

// =============================================================================
// Scheduler
// =============================================================================

type WaitEntry = Reverse<(Instant, u64, InstanceId)>;

/// Run queue plus wait queue of script instances.
pub struct Scheduler {
    instances: HashMap<InstanceId, Instance>,
    run_queue: VecDeque<InstanceId>,
    wait_queue: BinaryHeap<WaitEntry>,
    limits: Limits,
    max_passes: usize,
    rng: ChaCha8Rng,
    next_id: u64,
    /// Tie-breaker so equal wake times keep insertion order.
    wait_seq: u64,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("instances", &self.instances.len())
            .field("ready", &self.run_queue.len())
            .field("waiting", &self.wait_queue.len())
            .finish_non_exhaustive()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            instances: HashMap::new(),
            run_queue: VecDeque::new(),
            wait_queue: BinaryHeap::new(),
            limits: config.limits(),
            max_passes: config.max_passes_per_tick.max(1),
            rng,
            next_id: 1,
            wait_seq: 0,
        }
    }

    /// Adds an instance to the back of the run queue.
    pub fn spawn(&mut self, instance: Instance) -> InstanceId {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        debug!(instance = %id, script = instance.script(), bot = instance.bot(), "instance launched");
        self.instances.insert(id, instance);
        self.run_queue.push_back(id);
        id
    }

    /// Removes an instance from both queues. Returns false if it was not running.
    pub fn cancel(&mut self, id: InstanceId) -> bool {
        if self.instances.remove(&id).is_none() {
            return false;
        }
        self.run_queue.retain(|queued| *queued != id);
        self.wait_queue.retain(|Reverse((_, _, waiting))| *waiting != id);
        debug!(instance = %id, "instance cancelled");
        true
    }

    /// Cancels every instance acting for `bot`. Returns how many were removed.
    pub fn cancel_owner(&mut self, bot: &str) -> usize {
        let ids: Vec<InstanceId> = self
            .instances
            .iter()
            .filter(|(_, inst)| inst.bot() == bot)
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    /// Runs one scheduling tick at time `now`.
    pub fn tick(&mut self, now: Instant, host: &mut dyn ScriptHost) -> TickReport {
        self.wake_due(now);
        let mut report = TickReport::default();

        for _ in 0..self.max_passes {
            if self.run_queue.is_empty() {
                break;
            }
            // Only instances queued at the start of the pass run in it.
            let ready = self.run_queue.len();
            for _ in 0..ready {
                let Some(id) = self.run_queue.pop_front() else {
                    break;
                };
                self.run_one(id, now, host, &mut report);
            }
        }

        report
    }

    fn run_one(
        &mut self,
        id: InstanceId,
        now: Instant,
        host: &mut dyn ScriptHost,
        report: &mut TickReport,
    ) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        report.turns += 1;

        match instance.run_turn(host, &mut self.rng, &self.limits) {
            TurnOutcome::Yielded => self.run_queue.push_back(id),
            TurnOutcome::Suspended(duration) => {
                if let Some(wake) = now.checked_add(duration) {
                    self.wait_seq += 1;
                    self.wait_queue.push(Reverse((wake, self.wait_seq, id)));
                } else {
                    let err = Error::runtime(RuntimeError::InvalidArgument(format!(
                        "wait of {}s is beyond the clock's range",
                        duration.as_secs()
                    )))
                    .with_context(ErrorContext::new().with_source(instance.script()));
                    self.retire_failed(id, err, report);
                }
            }
            TurnOutcome::Finished => {
                debug!(instance = %id, script = instance.script(), "instance completed");
                self.instances.remove(&id);
                report.completed.push(id);
            }
            TurnOutcome::Failed(err) => self.retire_failed(id, err, report),
        }
    }

    fn retire_failed(&mut self, id: InstanceId, err: Error, report: &mut TickReport) {
        if let Some(instance) = self.instances.remove(&id) {
            warn!(
                instance = %id,
                script = instance.script(),
                bot = instance.bot(),
                error = %err,
                "script instance terminated"
            );
        }
        report.failed.push((id, err));
    }

    fn wake_due(&mut self, now: Instant) {
        while let Some(Reverse((wake, _, id))) = self.wait_queue.peek().copied() {
            if wake > now {
                break;
            }
            self.wait_queue.pop();
            if self.instances.contains_key(&id) {
                self.run_queue.push_back(id);
            }
        }
    }

    /// Earliest wake time of a sleeping instance.
    #[must_use]
    pub fn next_wake(&self) -> Option<Instant> {
        self.wait_queue.peek().map(|Reverse((wake, _, _))| *wake)
    }

    /// Returns true if some instance is ready to run now.
    #[must_use]
    pub fn has_ready(&self) -> bool {
        !self.run_queue.is_empty()
    }

    /// Returns true if no instances exist.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if no instances exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Looks up a live instance.
    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Ids of live instances, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.instances.keys().copied().collect();
        ids.sort();
        ids
    }
}
