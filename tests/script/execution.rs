//! Execution tests.
//!
//! Turn boundaries, suspension, variables and failure handling.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use textspace_foundation::RuntimeError;
use textspace_script::{Effect, Limits, TurnOutcome};

use crate::{host, instance, run_to_end};

#[test]
fn repeat_with_wait_says_three_times_with_suspensions_between() {
    let mut inst = instance("repeat 3 { say hi; wait 1 }");
    let mut host = host();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    // (says so far, outcome) after each turn.
    let mut timeline = Vec::new();
    loop {
        let outcome = inst.run_turn(&mut host, &mut rng, &Limits::default());
        let done = outcome == TurnOutcome::Finished;
        timeline.push((host.said().len(), outcome));
        if done {
            break;
        }
    }

    assert_eq!(host.said(), vec!["hi", "hi", "hi"]);
    let between = timeline
        .iter()
        .filter(|(said, outcome)| *said < 3 && matches!(outcome, TurnOutcome::Suspended(_)))
        .count();
    assert_eq!(between, 2);
    assert!(timeline
        .iter()
        .all(|(_, o)| matches!(o, TurnOutcome::Suspended(d) if *d == Duration::from_secs(1))
            || *o == TurnOutcome::Finished));
}

#[test]
fn variables_are_per_instance_and_compared_as_strings() {
    let source = "set mood calm\nif mood equals calm then say serene\nif mood equals $user then say odd\nset mood $user\nif mood equals alice then say matched";
    let mut host = host();
    let outcomes = run_to_end(&mut instance(source), &mut host, 1, &Limits::default());

    assert_eq!(outcomes, vec![TurnOutcome::Finished]);
    assert_eq!(host.said(), vec!["serene", "matched"]);
}

#[test]
fn callbacks_that_fail_are_skipped() {
    let source = "give lamp nobody\nsay still here\ntake coin alice\nmove garden\nsay from $bot";
    let mut host = host();
    let outcomes = run_to_end(&mut instance(source), &mut host, 1, &Limits::default());

    assert_eq!(outcomes, vec![TurnOutcome::Finished]);
    assert_eq!(
        host.effects,
        vec![
            Effect::Say {
                room: "lobby".into(),
                speaker: "guide".into(),
                text: "still here".into(),
            },
            Effect::Take {
                item: "coin".into(),
                from: "alice".into(),
                to: "guide".into(),
            },
            Effect::Move {
                bot: "guide".into(),
                room: "garden".into(),
            },
            Effect::Say {
                room: "garden".into(),
                speaker: "guide".into(),
                text: "from guide".into(),
            },
        ]
    );
}

#[test]
fn call_ends_the_turn_and_returns_to_the_caller() {
    let mut host = host();
    let outcomes = run_to_end(
        &mut instance("function greet { say hello }\ncall greet\nsay done"),
        &mut host,
        1,
        &Limits::default(),
    );

    assert_eq!(outcomes, vec![TurnOutcome::Yielded, TurnOutcome::Finished]);
    assert_eq!(host.said(), vec!["hello", "done"]);
}

#[test]
fn tail_calls_loop_without_growing_the_stack() {
    let mut inst = instance("function tick { say tick; wait 1; call tick }\ncall tick");
    let mut host = host();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let limits = Limits::default().with_max_call_depth(4);

    for _ in 0..50 {
        let outcome = inst.run_turn(&mut host, &mut rng, &limits);
        assert!(matches!(outcome, TurnOutcome::Yielded | TurnOutcome::Suspended(_)));
        assert!(inst.call_depth() <= 1);
    }
    assert!(host.said().len() >= 20);
}

#[test]
fn runaway_loops_yield_at_the_instruction_budget() {
    let mut inst = instance("repeat 1000 { set n x }");
    let mut host = host();
    let limits = Limits::default().with_max_instructions_per_turn(100);
    let outcomes = run_to_end(&mut inst, &mut host, 1, &limits);

    assert_eq!(outcomes.len(), 11);
    assert!(outcomes[..10].iter().all(|o| *o == TurnOutcome::Yielded));
    assert_eq!(outcomes.last(), Some(&TurnOutcome::Finished));
}

#[test]
fn random_say_picks_among_alternatives_at_run_time() {
    let mut host = host();
    let mut inst = instance("repeat 200 { random_say one|two|three }");
    let outcomes = run_to_end(&mut inst, &mut host, 99, &Limits::default());

    assert_eq!(outcomes, vec![TurnOutcome::Finished]);
    let said = host.said();
    assert_eq!(said.len(), 200);
    for choice in ["one", "two", "three"] {
        assert!(said.contains(&choice), "{choice} never chosen");
    }
}

#[test]
fn same_seed_same_choices() {
    let source = "repeat 20 { random_say a|b|c|d }";
    let mut first = host();
    let mut second = host();
    run_to_end(&mut instance(source), &mut first, 5, &Limits::default());
    run_to_end(&mut instance(source), &mut second, 5, &Limits::default());
    assert_eq!(first.effects, second.effects);
}

#[test]
fn runtime_errors_carry_the_call_chain() {
    let mut host = host();
    let outcomes = run_to_end(
        &mut instance("function outer { say in; say $missing }\ncall outer"),
        &mut host,
        1,
        &Limits::default(),
    );

    let Some(TurnOutcome::Failed(err)) = outcomes.last() else {
        panic!("expected failure, got {outcomes:?}");
    };
    assert_eq!(err.as_runtime(), Some(&RuntimeError::UndefinedVariable("missing".into())));
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.source.as_deref(), Some("test"));
    assert_eq!(context.stack, vec!["outer".to_string()]);
    assert_eq!(host.said(), vec!["in"]);
}
