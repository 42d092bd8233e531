//! Properties over generated registries.

use proptest::prelude::*;
use textspace_commands::{
    CandidateKind, Command, CommandRegistry, Completion, CompletionProvider, CompletionRequest,
    Resolution, Resolver, WorldSnapshot,
};

type Shape = (String, Vec<String>, bool);

fn shapes() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(
        (
            "[a-z]{2,7}",
            prop::collection::vec("[a-z]{1,5}", 0..3),
            any::<bool>(),
        ),
        1..12,
    )
}

/// Registers what it can; conflicting commands are dropped whole.
fn build(shapes: Vec<Shape>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for (name, aliases, admin) in shapes {
        let mut command = Command::new(name).with_aliases(aliases);
        if admin {
            command = command.admin_only();
        }
        let _ = registry.register(command);
    }
    registry
}

fn complete(registry: &CommandRegistry, line: &str, is_admin: bool) -> Completion {
    let request = CompletionRequest::from_line(line, "alice", is_admin);
    CompletionProvider::new(registry).complete(&request, &WorldSnapshot::new())
}

fn resolved_name(resolution: &Resolution) -> Option<&str> {
    resolution.command().map(|c| c.name.as_str())
}

proptest! {
    #[test]
    fn exact_name_resolves_to_its_command(commands in shapes()) {
        let registry = build(commands);
        let resolver = Resolver::new(&registry);
        for command in registry.iter() {
            let as_admin = resolver.resolve(&command.name, true);
            prop_assert_eq!(resolved_name(&as_admin), Some(command.name.as_str()));
            if !command.admin_only {
                let as_user = resolver.resolve(&command.name, false);
                prop_assert_eq!(resolved_name(&as_user), Some(command.name.as_str()));
            }
        }
    }

    #[test]
    fn single_letter_aliases_are_never_ambiguous(commands in shapes()) {
        let registry = build(commands);
        let resolver = Resolver::new(&registry);
        for command in registry.iter() {
            for alias in command.aliases.iter().filter(|a| a.len() == 1) {
                let resolution = resolver.resolve(alias, true);
                prop_assert!(!matches!(resolution, Resolution::Ambiguous(_)));
                prop_assert_eq!(resolved_name(&resolution), Some(command.name.as_str()));
            }
        }
    }

    #[test]
    fn prefix_resolution_matches_a_brute_force_scan(
        commands in shapes(),
        prefix in "[a-z]{2,3}",
        is_admin in any::<bool>(),
    ) {
        let registry = build(commands);
        let resolution = Resolver::new(&registry).resolve(&prefix, is_admin);

        if let Some(exact) = registry.get(&prefix).filter(|c| c.is_visible_to(is_admin)) {
            prop_assert_eq!(resolved_name(&resolution), Some(exact.name.as_str()));
        } else {
            let mut expected: Vec<String> = registry
                .iter()
                .filter(|c| c.is_visible_to(is_admin))
                .filter(|c| c.tokens().any(|t| t.starts_with(prefix.as_str())))
                .map(|c| c.name.clone())
                .collect();
            expected.sort();
            match expected.len() {
                0 => prop_assert_eq!(resolution, Resolution::NotFound),
                1 => prop_assert_eq!(resolved_name(&resolution), Some(expected[0].as_str())),
                _ => prop_assert_eq!(resolution, Resolution::Ambiguous(expected)),
            }
        }
    }

    #[test]
    fn admin_commands_are_invisible_to_non_admins(commands in shapes()) {
        let registry = build(commands);
        let resolver = Resolver::new(&registry);
        for command in registry.iter().filter(|c| c.admin_only) {
            let as_user = resolver.resolve(&command.name, false);
            prop_assert_ne!(resolved_name(&as_user), Some(command.name.as_str()));

            let public = complete(&registry, &command.name, false);
            for token in command.tokens() {
                prop_assert!(!public.insert_texts().contains(&token));
            }
            let admin = complete(&registry, &command.name, true);
            prop_assert!(admin.insert_texts().contains(&command.name.as_str()));
        }
    }

    #[test]
    fn every_alias_completes_on_its_own(commands in shapes()) {
        let registry = build(commands);
        for command in registry.iter() {
            for alias in &command.aliases {
                let completion = complete(&registry, alias, true);
                let found = completion.candidates.iter().any(|c| {
                    c.insert_text == *alias
                        && c.kind == CandidateKind::Alias { command: command.name.clone() }
                });
                prop_assert!(found);
            }
        }
    }

    #[test]
    fn common_prefix_prefixes_every_candidate(commands in shapes(), partial in "[a-z]{1,2}") {
        let registry = build(commands);
        let completion = complete(&registry, &partial, true);
        if let Some(prefix) = &completion.common_prefix {
            prop_assert!(prefix.len() > partial.len());
            for text in completion.insert_texts() {
                prop_assert!(text.starts_with(prefix.as_str()));
            }
        }
    }
}
