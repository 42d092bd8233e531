//! Completion tests.
//!
//! Help listing, command words, argument slots and common prefixes.

use textspace_commands::stdlib::standard_registry;
use textspace_commands::{
    ArgType, CandidateKind, Completion, CompletionProvider, CompletionRequest, ContainerView,
    WorldSnapshot,
};

fn world() -> WorldSnapshot {
    WorldSnapshot::new()
        .with_room_items(["brass lamp", "book", "chest"])
        .with_inventory(["silver key", "map"])
        .with_users(["alice", "bob", "bea"])
        .with_bots(["butler"])
        .with_containers([
            ContainerView::new("chest", true),
            ContainerView::new("cupboard", false),
        ])
        .with_rooms(["lobby", "library", "garden"])
}

fn complete(line: &str, is_admin: bool) -> Completion {
    let registry = standard_registry().unwrap();
    let request = CompletionRequest::from_line(line, "alice", is_admin);
    CompletionProvider::new(&registry).complete(&request, &world())
}

#[test]
fn empty_line_lists_every_visible_command_with_categories() {
    let public = complete("", false);
    assert!(public
        .candidates
        .iter()
        .all(|c| matches!(c.kind, CandidateKind::Help { .. })));
    assert_eq!(public.candidates[0].display, "look (l) <examinable>");
    assert!(!public.insert_texts().contains(&"teleport"));

    let admin = complete("", true);
    let teleport = admin
        .candidates
        .iter()
        .find(|c| c.insert_text == "teleport")
        .unwrap();
    assert_eq!(teleport.display, "teleport <room>");
    assert_eq!(
        teleport.kind,
        CandidateKind::Help {
            category: "Admin".into()
        }
    );
}

#[test]
fn command_words_include_each_matching_alias() {
    let completion = complete("t", false);
    let texts = completion.insert_texts();
    assert!(texts.contains(&"tell"));
    assert!(texts.contains(&"t"));
    assert!(texts.contains(&"take"));
    assert!(!texts.contains(&"teleport"));

    let take = completion
        .candidates
        .iter()
        .find(|c| c.insert_text == "take")
        .unwrap();
    assert_eq!(
        take.kind,
        CandidateKind::Alias {
            command: "get".into()
        }
    );
}

#[test]
fn common_prefix_extends_past_typed_text() {
    assert_eq!(complete("in", false).common_prefix.as_deref(), Some("inv"));
    assert_eq!(complete("cl", false).common_prefix.as_deref(), Some("close"));
    assert_eq!(complete("wh", false).common_prefix, None);
    assert_eq!(complete("zz", false).common_prefix, None);
}

#[test]
fn examinable_unions_everything_in_view() {
    let completion = complete("examine b", false);
    assert_eq!(completion.insert_texts(), vec!["brass lamp", "book", "bob", "bea", "butler"]);
    assert!(completion
        .candidates
        .iter()
        .all(|c| c.kind == CandidateKind::Argument(ArgType::Examinable)));
}

#[test]
fn multi_word_names_complete_word_by_word() {
    let completion = complete("get brass l", false);
    assert_eq!(completion.insert_texts(), vec!["lamp"]);
    assert_eq!(completion.candidates[0].display, "brass lamp");

    assert_eq!(complete("drop silver k", false).insert_texts(), vec!["key"]);
}

#[test]
fn direction_is_a_fixed_set() {
    assert_eq!(complete("go ", false).insert_texts().len(), 6);
    assert_eq!(complete("go u", false).insert_texts(), vec!["up"]);
}

#[test]
fn user_slot_skips_the_caller() {
    assert_eq!(complete("tell ", false).insert_texts(), vec!["bob", "bea"]);
    assert_eq!(complete("whisper a", false).insert_texts(), Vec::<&str>::new());
}

#[test]
fn room_slot_is_admin_only() {
    assert!(complete("teleport l", false).is_empty());
    assert_eq!(complete("teleport l", true).insert_texts(), vec!["lobby", "library"]);
    assert_eq!(complete("teleport l", true).common_prefix, None);
}

#[test]
fn open_and_close_follow_container_state() {
    assert_eq!(complete("open c", false).insert_texts(), vec!["cupboard"]);
    assert_eq!(complete("close c", false).insert_texts(), vec!["chest"]);
}

#[test]
fn prepositional_grammar_offers_the_preposition_then_the_target() {
    let completion = complete("put map i", false);
    assert_eq!(completion.insert_texts(), vec!["in"]);
    assert_eq!(completion.candidates[0].kind, CandidateKind::Preposition);

    assert_eq!(complete("put map in c", false).insert_texts(), vec!["chest"]);
    assert_eq!(complete("give map to b", false).insert_texts(), vec!["bob", "bea"]);
}

#[test]
fn unresolved_or_quoted_lines_complete_nothing() {
    assert!(complete("xyzzy f", false).is_empty());
    assert!(complete("wh b", false).is_empty());
    assert!(complete("\"hello t", false).is_empty());
}
