//! Script loading tests.
//!
//! A malformed script is rejected with its name and position attached.

use textspace_foundation::ErrorKind;
use textspace_script::{EventKind, Instruction, Script, Term, Trigger, parse};

#[test]
fn load_keeps_source_and_trigger() {
    let script = Script::load(
        "greeter",
        "guide",
        "say Welcome, $user!",
        Some(Trigger::in_room(EventKind::EnterRoom, "lobby")),
    )
    .unwrap();

    assert_eq!(script.name, "greeter");
    assert_eq!(script.bot, "guide");
    assert_eq!(script.source, "say Welcome, $user!");
    assert_eq!(script.program.len(), 1);
    assert_eq!(script.trigger.unwrap().room.as_deref(), Some("lobby"));
}

#[test]
fn syntax_errors_name_the_script_and_position() {
    let err = Script::load("broken", "guide", "say hi\nrepeat 2 {\n  dance\n}", None).unwrap_err();

    let ErrorKind::Syntax { line, column, message } = &err.kind else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!((*line, *column), (3, 3));
    assert_eq!(message, "unknown instruction 'dance'");

    let context = err.context.unwrap();
    assert_eq!(context.source.as_deref(), Some("broken"));
}

#[test]
fn each_rejection_rule_applies() {
    for source in [
        "shout hello",
        "repeat 3 {\n  say hi",
        "function f {\n  say hi",
        "call f\nfunction f { say hi }",
        "if mood equals calm say hi",
        "if mood equals calm then",
    ] {
        let err = parse(source).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax { .. }), "{source}");
    }
}

#[test]
fn quoted_strings_keep_spacing() {
    let program = parse("say \"two  spaces\"").unwrap();
    let Instruction::Say(text) = &program.body[0] else {
        panic!("expected say");
    };
    assert_eq!(text.terms, vec![Term::literal("two  spaces")]);
}

#[test]
fn nested_blocks_parse_into_a_tree() {
    let program = parse(
        "function patrol {\n  repeat 2 {\n    move hall\n    wait 1\n    move lobby\n  }\n}\ncall patrol",
    )
    .unwrap();

    assert_eq!(program.len(), 2);
    assert_eq!(program.function_names(), vec!["patrol"]);
    let Instruction::FunctionDef { body, .. } = &program.body[0] else {
        panic!("expected function");
    };
    let Instruction::Repeat { count, body } = &body[0] else {
        panic!("expected repeat");
    };
    assert_eq!(*count, 2);
    assert_eq!(body.len(), 3);
}
