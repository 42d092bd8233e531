//! Engine configuration.

use std::time::Duration;

use textspace_script::Limits;

/// Configuration for script execution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineConfig {
    /// Maximum nested function calls per instance.
    pub max_call_depth: usize,

    /// Instructions an instance may run per turn before it is made to yield.
    pub max_instructions_per_turn: usize,

    /// Round-robin passes over the run queue per tick.
    pub max_passes_per_tick: usize,

    /// Seed for `random_say`; `None` seeds from the OS.
    pub rng_seed: Option<u64>,

    /// How often the host should call `tick`, in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 64,
            max_instructions_per_turn: 1000,
            max_passes_per_tick: 8,
            rng_seed: None,
            tick_interval_ms: 100,
        }
    }
}

impl EngineConfig {
    /// A reproducible configuration: fixed seed, one pass per tick.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            max_passes_per_tick: 1,
            ..Self::default()
        }
    }

    /// Builder method to set the call depth bound.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Builder method to set the per-turn instruction budget.
    #[must_use]
    pub fn with_max_instructions_per_turn(mut self, budget: usize) -> Self {
        self.max_instructions_per_turn = budget;
        self
    }

    /// Builder method to set passes per tick.
    #[must_use]
    pub fn with_max_passes_per_tick(mut self, passes: usize) -> Self {
        self.max_passes_per_tick = passes;
        self
    }

    /// Builder method to set the random seed.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Builder method to set the tick interval.
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    /// Interpreter limits derived from this configuration.
    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits::default()
            .with_max_call_depth(self.max_call_depth)
            .with_max_instructions_per_turn(self.max_instructions_per_turn.max(1))
    }

    /// The tick interval as a duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
