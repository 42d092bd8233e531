//! Resolver tests.
//!
//! Priority order: single-letter alias, exact name, unique prefix.

use textspace_commands::stdlib::standard_registry;
use textspace_commands::{Command, CommandRegistry, Resolution, Resolver};
use textspace_foundation::ErrorKind;

fn name(resolution: &Resolution) -> Option<&str> {
    resolution.command().map(|c| c.name.as_str())
}

#[test]
fn teleport_and_tell_scenario() {
    let registry = CommandRegistry::from_commands([
        Command::new("teleport").admin_only(),
        Command::new("tell").with_alias("t"),
    ])
    .unwrap();
    let resolver = Resolver::new(&registry);

    assert_eq!(name(&resolver.resolve("tel", true)), Some("teleport"));
    assert_eq!(resolver.resolve("tel", false), Resolution::NotFound);
    assert_eq!(name(&resolver.resolve("t", true)), Some("tell"));
    assert_eq!(name(&resolver.resolve("t", false)), Some("tell"));
}

#[test]
fn exact_name_beats_longer_prefix_matches() {
    let registry = CommandRegistry::from_commands([
        Command::new("go"),
        Command::new("gossip"),
        Command::new("goto"),
    ])
    .unwrap();
    let resolver = Resolver::new(&registry);

    assert_eq!(name(&resolver.resolve("go", false)), Some("go"));
    assert_eq!(
        resolver.resolve("gos", false),
        Resolution::Resolved(registry.lookup("gossip").unwrap().clone())
    );
}

#[test]
fn ambiguous_prefix_lists_sorted_primary_names() {
    let registry = standard_registry().unwrap();
    let resolver = Resolver::new(&registry);

    // "wh" reaches who and whisper; "w" alone is whisper's alias.
    assert_eq!(
        resolver.resolve("wh", false),
        Resolution::Ambiguous(vec!["whisper".into(), "who".into()])
    );
    assert_eq!(name(&resolver.resolve("w", false)), Some("whisper"));
}

#[test]
fn aliases_of_one_command_count_once() {
    let registry = CommandRegistry::from_commands([
        Command::new("inventory").with_aliases(["inv", "invent"]),
        Command::new("look"),
    ])
    .unwrap();
    let resolver = Resolver::new(&registry);

    assert_eq!(name(&resolver.resolve("in", false)), Some("inventory"));
}

#[test]
fn prefix_through_alias_only() {
    let registry = standard_registry().unwrap();
    let resolver = Resolver::new(&registry);

    // "tak" matches no primary name, only get's alias "take".
    assert_eq!(name(&resolver.resolve("tak", false)), Some("get"));
}

#[test]
fn admin_commands_hidden_from_non_admins() {
    let registry = standard_registry().unwrap();
    let resolver = Resolver::new(&registry);

    assert_eq!(resolver.resolve("teleport", false), Resolution::NotFound);
    assert_eq!(resolver.resolve("broad", false), Resolution::NotFound);
    assert_eq!(name(&resolver.resolve("broad", true)), Some("broadcast"));

    // "scr" is ambiguous for admins only.
    assert_eq!(
        resolver.resolve("scr", true),
        Resolution::Ambiguous(vec!["script".into(), "scripts".into()])
    );
    assert_eq!(name(&resolver.resolve("script", true)), Some("script"));
    assert_eq!(resolver.resolve("scr", false), Resolution::NotFound);
}

#[test]
fn resolution_is_case_insensitive_and_trims() {
    let registry = standard_registry().unwrap();
    let resolver = Resolver::new(&registry);

    assert_eq!(name(&resolver.resolve("  LOOK ", false)), Some("look"));
    assert_eq!(name(&resolver.resolve("Inv", false)), Some("inventory"));
    assert_eq!(resolver.resolve("", false), Resolution::NotFound);
}

#[test]
fn into_result_maps_outcomes_to_errors() {
    let registry = standard_registry().unwrap();
    let resolver = Resolver::new(&registry);

    assert_eq!(
        resolver.resolve("wh", false).into_result("wh").unwrap_err().kind,
        ErrorKind::AmbiguousCommand(vec!["whisper".into(), "who".into()])
    );
    assert_eq!(
        resolver.resolve("xyzzy", false).into_result("xyzzy").unwrap_err().kind,
        ErrorKind::CommandNotFound("xyzzy".into())
    );
    assert_eq!(
        resolver.resolve("who", false).into_result("who").unwrap().name,
        "who"
    );
}
