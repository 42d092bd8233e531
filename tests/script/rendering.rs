//! Rendering tests.
//!
//! A rendered program parses back to the same tree and behaves the same.

use proptest::prelude::*;
use textspace_script::pretty::render;
use textspace_script::{Limits, parse};

use crate::{host, instance, run_to_end};

#[test]
fn rendering_normalises_layout() {
    let program = parse("# greeter\nfunction greet { say Hi $user; wait 0.5 }\ncall greet").unwrap();
    assert_eq!(
        render(&program),
        "function greet {\n  say Hi $user\n  wait 0.5\n}\ncall greet\n"
    );
}

#[test]
fn rendered_conditionals_and_alternatives_reparse() {
    let source = "if mood equals \"very calm\" then random_say a b|\"c|d\"\nset mood $user!";
    let program = parse(source).unwrap();
    assert_eq!(parse(&render(&program)).unwrap(), program);
}

fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(String::from),
        Just("$user".to_string()),
        Just("$bot".to_string()),
        Just("$mood".to_string()),
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|w| w.join(" "))
}

fn statement() -> impl Strategy<Value = String> {
    let simple = prop_oneof![
        text().prop_map(|t| format!("say {t}")),
        text().prop_map(|t| format!("broadcast {t}")),
        prop::collection::vec(text(), 1..4).prop_map(|alts| format!("random_say {}", alts.join("|"))),
        (0u32..3, 0u32..10).prop_map(|(a, b)| format!("wait {a}.{b}")),
        text().prop_map(|t| format!("set mood {t}")),
        (word(), text()).prop_map(|(w, t)| format!("if mood equals {w} then say {t}")),
        prop_oneof![Just("lobby"), Just("garden")].prop_map(|r| format!("move {r}")),
        word().prop_map(|i| format!("give {i} alice")),
        word().prop_map(|i| format!("take {i} $user")),
    ];
    simple.prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            (0u32..4, prop::collection::vec(inner.clone(), 1..4))
                .prop_map(|(n, body)| format!("repeat {n} {{ {} }}", body.join("; "))),
            prop::collection::vec(inner, 1..4)
                .prop_map(|body| format!("function f {{\n{}\n}}\ncall f", body.join("\n"))),
        ]
    })
}

fn script() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 1..6).prop_map(|s| s.join("\n"))
}

proptest! {
    #[test]
    fn rendered_source_has_the_same_side_effects(source in script(), seed in any::<u64>()) {
        let program = parse(&source).unwrap();
        let rendered = render(&program);
        prop_assert_eq!(&parse(&rendered).unwrap(), &program);

        let mut original_host = host();
        let original = run_to_end(&mut instance(&source), &mut original_host, seed, &Limits::default());
        let mut rendered_host = host();
        let again = run_to_end(&mut instance(&rendered), &mut rendered_host, seed, &Limits::default());

        prop_assert_eq!(original, again);
        prop_assert_eq!(original_host.effects, rendered_host.effects);
    }
}
