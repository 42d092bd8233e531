//! Scheduling tests.
//!
//! Waits suspend only their own instance; turns interleave fairly.

use std::time::{Duration, Instant};

use textspace_engine::{Engine, EngineConfig, EventContext};
use textspace_foundation::ErrorKind;
use textspace_script::{Effect, ScriptHost};

use crate::{elapsed, engine, host, run_until_idle};

fn context() -> EventContext {
    EventContext::new("alice", "lobby")
}

#[test]
fn a_waiting_instance_does_not_block_others() {
    let mut engine = engine();
    engine.load_script("slow", "guide", "say a1; wait 5; say a2", None).unwrap();
    engine.load_script("fast", "owl", "say b1; say b2", None).unwrap();
    engine.run_script("slow", &context()).unwrap();
    engine.run_script("fast", &context()).unwrap();

    let mut host = host();
    let start = Instant::now();
    let report = engine.tick(start, &mut host);
    assert_eq!(host.said(), vec!["a1", "b1", "b2"]);
    assert_eq!(report.completed.len(), 1);
    assert!(!engine.is_idle());

    // Nothing is due before the wake time.
    engine.tick(start + Duration::from_secs(4), &mut host);
    assert_eq!(host.said().len(), 3);
    assert_eq!(engine.next_wake(), Some(start + Duration::from_secs(5)));

    let end = run_until_idle(&mut engine, &mut host, start + Duration::from_secs(4));
    assert_eq!(host.said(), vec!["a1", "b1", "b2", "a2"]);
    assert_eq!(elapsed(start, end), Duration::from_secs(5));
    assert_eq!(engine.next_wake(), None);
}

#[test]
fn busy_instances_take_turns() {
    let config = EngineConfig::deterministic(1).with_max_instructions_per_turn(10);
    let mut engine = Engine::new(config);
    engine.load_script("a", "guide", "repeat 50 { say a }", None).unwrap();
    engine.load_script("b", "owl", "repeat 50 { say b }", None).unwrap();
    engine.run_script("a", &context()).unwrap();
    engine.run_script("b", &context()).unwrap();

    let mut host = host();
    let report = engine.tick(Instant::now(), &mut host);
    assert_eq!(report.turns, 2);
    let said = host.said();
    assert_eq!(said.len(), 18);
    assert_eq!(said[..9], ["a"; 9]);
    assert_eq!(said[9..], ["b"; 9]);

    run_until_idle(&mut engine, &mut host, Instant::now());
    assert_eq!(host.said().len(), 100);
}

#[test]
fn more_passes_give_more_turns_per_tick() {
    let config = EngineConfig::deterministic(1)
        .with_max_instructions_per_turn(10)
        .with_max_passes_per_tick(3);
    let mut engine = Engine::new(config);
    engine.load_script("a", "guide", "repeat 50 { say a }", None).unwrap();
    engine.run_script("a", &context()).unwrap();

    let mut host = host();
    let report = engine.tick(Instant::now(), &mut host);
    assert_eq!(report.turns, 3);
    assert_eq!(host.said().len(), 29);
}

#[test]
fn host_state_is_read_again_after_a_wait() {
    let mut engine = engine();
    engine
        .load_script("guide_talk", "guide", "say here; wait 1; say still here", None)
        .unwrap();
    engine.run_script("guide_talk", &context()).unwrap();

    let mut host = host();
    let start = Instant::now();
    engine.tick(start, &mut host);
    host.move_bot("guide", "garden").unwrap();
    run_until_idle(&mut engine, &mut host, start);

    let rooms: Vec<&str> = host
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::Say { room, .. } => Some(room.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(rooms, vec!["lobby", "garden"]);
}

#[test]
fn cancelled_instances_leave_both_queues() {
    let mut engine = engine();
    engine.load_script("sleeper", "guide", "wait 10; say late", None).unwrap();
    engine.load_script("chatter", "owl", "repeat 3 { say hi; wait 1 }", None).unwrap();
    let sleeper = engine.run_script("sleeper", &context()).unwrap();
    let chatter = engine.run_script("chatter", &context()).unwrap();

    let mut host = host();
    let start = Instant::now();
    engine.tick(start, &mut host);
    assert!(engine.cancel(sleeper));
    assert!(!engine.cancel(sleeper));

    run_until_idle(&mut engine, &mut host, start);
    assert_eq!(host.said(), vec!["hi", "hi", "hi"]);
    assert!(engine.scheduler().instance(chatter).is_none());
}

#[test]
fn cancelling_an_owner_stops_all_its_instances() {
    let mut engine = engine();
    engine.load_script("patrol", "guide", "repeat 5 { say on duty; wait 1 }", None).unwrap();
    engine.load_script("hoot", "owl", "wait 1; say hoot", None).unwrap();
    engine.run_script("patrol", &context()).unwrap();
    engine.run_script("patrol", &context()).unwrap();
    engine.run_script("hoot", &context()).unwrap();

    assert_eq!(engine.cancel_owner("guide"), 2);
    assert_eq!(engine.scheduler().len(), 1);

    let mut host = host();
    run_until_idle(&mut engine, &mut host, Instant::now());
    assert_eq!(host.said(), vec!["hoot"]);
}

#[test]
fn unknown_scripts_cannot_be_run() {
    let mut engine = engine();
    let err = engine.run_script("ghost", &context()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config("unknown script: ghost".into()));
}
