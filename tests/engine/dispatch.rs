//! Dispatch tests.
//!
//! Events launch fresh instances of every matching script.

use textspace_engine::EventContext;
use textspace_script::{EventKind, Trigger};

use crate::{engine, host, run_until_idle};

#[test]
fn room_specific_scripts_launch_before_wildcards() {
    let mut engine = engine();
    engine
        .load_script("anywhere", "owl", "say hoot", Some(Trigger::any_room(EventKind::EnterRoom)))
        .unwrap();
    engine
        .load_script(
            "lobby_only",
            "guide",
            "say Welcome to the $room, $user",
            Some(Trigger::in_room(EventKind::EnterRoom, "lobby")),
        )
        .unwrap();

    let launched = engine.dispatch(EventKind::EnterRoom, "lobby", &EventContext::new("alice", "lobby"));
    assert_eq!(launched.len(), 2);
    assert_eq!(engine.scheduler().instance(launched[0]).unwrap().script(), "lobby_only");
    assert_eq!(engine.scheduler().instance(launched[1]).unwrap().script(), "anywhere");

    let mut host = host();
    run_until_idle(&mut engine, &mut host, std::time::Instant::now());
    assert_eq!(host.said(), vec!["Welcome to the lobby, alice", "hoot"]);
}

#[test]
fn dispatch_binds_event_and_room() {
    let mut engine = engine();
    engine
        .load_script(
            "echo",
            "guide",
            "say $user $event $room",
            Some(Trigger::any_room(EventKind::LeaveRoom)),
        )
        .unwrap();

    engine.dispatch(EventKind::LeaveRoom, "garden", &EventContext::new("alice", "lobby"));
    let mut host = host();
    run_until_idle(&mut engine, &mut host, std::time::Instant::now());
    assert_eq!(host.said(), vec!["alice leave_room garden"]);
}

#[test]
fn unmatched_events_launch_nothing() {
    let mut engine = engine();
    engine
        .load_script(
            "greeter",
            "guide",
            "say hi",
            Some(Trigger::in_room(EventKind::EnterRoom, "lobby")),
        )
        .unwrap();

    let context = EventContext::new("alice", "garden");
    assert!(engine.dispatch(EventKind::EnterRoom, "garden", &context).is_empty());
    assert!(engine.dispatch(EventKind::LeaveRoom, "lobby", &context).is_empty());
    assert!(engine.is_idle());
}

#[test]
fn every_dispatch_gets_its_own_instance() {
    let mut engine = engine();
    engine
        .load_script(
            "greeter",
            "guide",
            "say hi $user",
            Some(Trigger::in_room(EventKind::EnterRoom, "lobby")),
        )
        .unwrap();

    for user in ["alice", "bob", "carol"] {
        engine.dispatch(EventKind::EnterRoom, "lobby", &EventContext::new(user, "lobby"));
    }
    assert_eq!(engine.scheduler().len(), 3);

    let mut host = host();
    run_until_idle(&mut engine, &mut host, std::time::Instant::now());
    assert_eq!(host.said(), vec!["hi alice", "hi bob", "hi carol"]);
}

#[test]
fn rejected_scripts_are_never_triggered() {
    let mut engine = engine();
    let trigger = Some(Trigger::in_room(EventKind::EnterRoom, "lobby"));
    assert!(engine.load_script("broken", "guide", "dance", trigger.clone()).is_err());
    assert!(engine.script("broken").is_none());
    assert!(engine.triggers().is_empty());

    // A bad reload keeps the previous version.
    engine.load_script("greeter", "guide", "say hi", trigger.clone()).unwrap();
    assert!(engine.load_script("greeter", "guide", "repeat x { say hi }", trigger).is_err());
    assert_eq!(engine.script("greeter").unwrap().source, "say hi");
    assert_eq!(
        engine.triggers().matching(EventKind::EnterRoom, "lobby"),
        vec!["greeter"]
    );
}

#[test]
fn unloading_removes_the_trigger() {
    let mut engine = engine();
    engine
        .load_script("greeter", "guide", "say hi", Some(Trigger::any_room(EventKind::EnterRoom)))
        .unwrap();
    assert!(engine.unload_script("greeter"));
    assert!(!engine.unload_script("greeter"));
    assert!(engine
        .dispatch(EventKind::EnterRoom, "lobby", &EventContext::new("alice", "lobby"))
        .is_empty());
}
