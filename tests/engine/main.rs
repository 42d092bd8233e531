//! Integration tests for the textspace_engine crate.
//!
//! Tests for the script engine:
//! - Event dispatch through the trigger table
//! - Cooperative scheduling across ticks
//! - Failure isolation and cancellation

mod dispatch;
mod scheduling;

use std::time::{Duration, Instant};

use textspace_engine::{Engine, EngineConfig};
use textspace_script::RecordingHost;

/// An engine with a fixed seed and one pass per tick.
pub fn engine() -> Engine {
    Engine::new(EngineConfig::deterministic(42))
}

/// A host with the guide and the owl in the lobby.
pub fn host() -> RecordingHost {
    RecordingHost::new()
        .with_bot("guide", "lobby")
        .with_bot("owl", "lobby")
        .with_user("alice")
}

/// Ticks on a simulated clock, jumping to each wake time, until idle.
pub fn run_until_idle(engine: &mut Engine, host: &mut RecordingHost, start: Instant) -> Instant {
    let mut now = start;
    for _ in 0..10_000 {
        if engine.is_idle() {
            break;
        }
        if !engine.scheduler().has_ready() {
            if let Some(wake) = engine.next_wake() {
                now = now.max(wake);
            }
        }
        engine.tick(now, host);
    }
    now
}

/// Seconds between two instants, rounded to milliseconds.
pub fn elapsed(start: Instant, end: Instant) -> Duration {
    Duration::from_millis(u64::try_from(end.duration_since(start).as_millis()).unwrap_or(u64::MAX))
}
