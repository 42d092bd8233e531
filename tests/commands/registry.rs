//! Registry tests.
//!
//! Registration conflicts, case-insensitive lookup and listing order.

use textspace_commands::stdlib::{standard_commands, standard_registry};
use textspace_commands::{Command, CommandRegistry};
use textspace_foundation::ErrorKind;

#[test]
fn duplicate_alias_is_rejected_without_partial_insert() {
    let mut registry = CommandRegistry::new();
    registry
        .register(Command::new("tell").with_alias("t"))
        .unwrap();

    let err = registry
        .register(Command::new("take").with_aliases(["grab", "t"]))
        .unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::DuplicateAlias {
            alias: "t".into(),
            existing: "tell".into(),
            command: "take".into(),
        }
    );

    // Nothing from the rejected command leaked in.
    assert_eq!(registry.len(), 1);
    assert!(registry.lookup("grab").is_none());
    assert!(registry.lookup("take").is_none());
}

#[test]
fn name_colliding_with_alias_is_rejected() {
    let err = CommandRegistry::from_commands([
        Command::new("inventory").with_alias("inv"),
        Command::new("inv"),
    ])
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateAlias { .. }));
}

#[test]
fn lookup_is_case_insensitive_over_names_and_aliases() {
    let registry = standard_registry().unwrap();

    assert_eq!(registry.lookup("LOOK").unwrap().name, "look");
    assert_eq!(registry.lookup("L").unwrap().name, "look");
    assert_eq!(registry.lookup("Ex").unwrap().name, "examine");
    assert!(registry.lookup("lo").is_none());
}

#[test]
fn get_ignores_aliases() {
    let registry = standard_registry().unwrap();

    assert!(registry.get("take").is_none());
    assert_eq!(registry.get("get").unwrap().name, "get");
}

#[test]
fn all_commands_keeps_registration_order_and_filters_admin() {
    let registry = standard_registry().unwrap();

    let public: Vec<&str> = registry
        .all_commands(false)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(public.first(), Some(&"look"));
    assert!(!public.contains(&"teleport"));
    assert!(!public.contains(&"broadcast"));

    let admin: Vec<&str> = registry
        .all_commands(true)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    let expected: Vec<String> = standard_commands().into_iter().map(|c| c.name).collect();
    assert_eq!(admin, expected);
}

#[test]
fn registry_is_shareable_across_threads() {
    let registry = std::sync::Arc::new(standard_registry().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || registry.lookup("who").map(|c| c.name.clone()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("who"));
    }
}
