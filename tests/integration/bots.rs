//! Scripted bot tests.
//!
//! Triggers fire on player movement, scripts act on the live world and
//! admins can start or stop them.

use crate::Table;

#[test]
fn entering_the_garden_earns_a_map() {
    let mut table = Table::new(&["alice"]);

    assert!(table.run("alice", "go north").starts_with("== garden =="));
    table.settle();

    assert_eq!(
        table.heard("alice"),
        vec![
            "guide says: *gives map to alice*",
            "guide says: Enjoy the garden, alice.",
        ]
    );
    assert_eq!(table.run("alice", "inventory"), "You are carrying: map");

    // The guide has nothing left to give, so the second visit only talks.
    table.run("alice", "go south");
    table.run("alice", "go north");
    table.settle();
    assert_eq!(
        table.heard("alice"),
        vec!["guide says: Enjoy the garden, alice."]
    );
    assert!(table.session.engine().is_idle());
}

#[test]
fn admins_start_scripts_by_name() {
    let mut table = Table::new(&["alice", "root"]);

    assert_eq!(table.run("alice", "script chime"), "Unknown command: script");
    let started = table.run("root", "script chime");
    assert!(started.starts_with("Started script chime"), "{started}");
    table.settle();

    assert_eq!(table.heard("alice"), vec!["[guide] dong", "[guide] dong"]);
    assert_eq!(table.run("root", "script ghost"), "You don't see 'ghost' here.");
}

#[test]
fn script_listing_shows_triggers_and_running_instances() {
    let mut table = Table::new(&["root"]);
    table.run("root", "script chime");

    let listing = table.run("root", "scripts");
    assert!(listing.contains("chime [guide]"), "{listing}");
    assert!(listing.contains("gift [guide] on"), "{listing}");
    assert!(listing.ends_with("Running instances: 1"), "{listing}");
}

#[test]
fn removing_a_bot_stops_its_scripts() {
    let mut table = Table::new(&["alice", "root"]);
    table.run("root", "script chime");
    table.session.tick(std::time::Instant::now());
    assert!(!table.session.engine().is_idle());

    assert!(table.session.remove_bot("guide"));
    assert!(table.session.engine().is_idle());
    table.settle();
    assert_eq!(table.heard("alice"), vec!["[guide] dong"]);

    // The guide's scripts went with it, so the garden stays quiet.
    assert_eq!(table.run("root", "scripts"), "No scripts loaded.");
    assert!(table.session.engine().triggers().is_empty());
    table.run("alice", "go north");
    assert!(table.session.engine().is_idle());
    assert_eq!(table.run("alice", "i"), "You are carrying nothing.");
}
