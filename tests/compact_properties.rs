//! Property tests for the compactor and humanizer
//!
//! Raw results are generated with every outcome flag independently on or
//! off, so the priority rules are exercised in all combinations.

use proptest::prelude::*;
use serde_json::{Map, Value};

use consult::dialog::{
    compact, humanize, ChooseResult, ConfirmResult, DialogOutcome, QuestionsResult, RawResult,
    Selection, TextInputResult, TweakResult,
};

fn blankable_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("  ".to_string())),
        "[a-z]{1,8}( [a-z]{1,8})?".prop_map(Some),
    ]
}

fn outcome() -> impl Strategy<Value = DialogOutcome> {
    (
        (
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of(0u64..120),
            proptest::option::of(0u64..7200),
        ),
        (
            blankable_text(),
            blankable_text(),
            blankable_text(),
            blankable_text(),
        ),
    )
        .prop_map(
            |(
                (cancelled, dismissed, snoozed, snooze_minutes, remaining_seconds),
                (comment, feedback_text, ask_differently, instruction),
            )| DialogOutcome {
                cancelled,
                dismissed,
                comment,
                snoozed,
                snooze_minutes,
                remaining_seconds,
                feedback_text,
                ask_differently,
                instruction,
            },
        )
}

fn answer_map() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::vec(
        (
            "[a-z]{1,6}",
            prop_oneof![
                Just(Value::Null),
                "[A-Za-z]{1,8}".prop_map(Value::String),
                (0i64..100).prop_map(Value::from),
                proptest::collection::vec("[A-Za-z]{1,5}", 0..3).prop_map(|v| Value::from(v)),
            ],
        ),
        0..5,
    )
    .prop_map(|entries| entries.into_iter().collect())
}

fn raw_result() -> impl Strategy<Value = RawResult> {
    prop_oneof![
        (proptest::option::of(any::<bool>()), outcome())
            .prop_map(|(confirmed, outcome)| RawResult::Confirm(ConfirmResult { confirmed, outcome })),
        (
            proptest::option::of(prop_oneof![
                "[A-Za-z]{1,8}".prop_map(Selection::One),
                proptest::collection::vec("[A-Za-z]{1,8}", 0..4).prop_map(Selection::Many),
            ]),
            outcome()
        )
            .prop_map(|(answer, outcome)| RawResult::Pick(ChooseResult { answer, outcome })),
        (proptest::option::of("[ -~]{0,12}"), outcome())
            .prop_map(|(answer, outcome)| RawResult::Text(TextInputResult { answer, outcome })),
        (answer_map(), proptest::option::of(0usize..6), outcome()).prop_map(
            |(answers, completed_count, outcome)| RawResult::Form(QuestionsResult {
                answers,
                completed_count,
                outcome,
            })
        ),
        (answer_map(), blankable_text(), proptest::option::of(any::<bool>()), outcome()).prop_map(
            |(values, action, replay_animations, outcome)| RawResult::Tweak(TweakResult {
                values,
                action,
                replay_animations,
                outcome,
            })
        ),
    ]
}

/// Overwrite outcome fields to force a branch of the priority order.
fn with_outcome(mut raw: RawResult, edit: impl FnOnce(&mut DialogOutcome)) -> RawResult {
    let outcome = match &mut raw {
        RawResult::Confirm(r) => &mut r.outcome,
        RawResult::Pick(r) => &mut r.outcome,
        RawResult::Text(r) => &mut r.outcome,
        RawResult::Form(r) => &mut r.outcome,
        RawResult::Tweak(r) => &mut r.outcome,
    };
    edit(outcome);
    raw
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

proptest! {
    #[test]
    fn snooze_discards_everything_else(raw in raw_result()) {
        let raw = with_outcome(raw, |o| o.snoozed = Some(true));
        let value = compact(&raw).to_value();
        let map = value.as_object().unwrap();
        prop_assert_eq!(map.get("snoozed"), Some(&Value::Bool(true)));
        prop_assert!(map.keys().all(|k| k == "snoozed" || k == "remainingSeconds"));
    }

    #[test]
    fn ask_differently_beats_feedback_and_cancel(raw in raw_result(), format in "[a-z-]{1,12}") {
        let raw = with_outcome(raw, |o| {
            o.snoozed = None;
            o.ask_differently = Some(format.clone());
        });
        let value = compact(&raw).to_value();
        let map = value.as_object().unwrap();
        prop_assert_eq!(map.len(), 1);
        prop_assert_eq!(map.get("askDifferently"), Some(&Value::String(format)));
    }

    #[test]
    fn feedback_suppresses_cancel(raw in raw_result(), feedback in "[a-z]{1,8}") {
        let raw = with_outcome(raw, |o| {
            o.snoozed = None;
            o.ask_differently = None;
            o.feedback_text = Some(feedback.clone());
        });
        let value = compact(&raw).to_value();
        prop_assert_eq!(value.get("feedbackText"), Some(&Value::String(feedback)));
        prop_assert!(value.get("cancelled").is_none());
    }

    #[test]
    fn cancelled_drops_answers_except_forms(raw in raw_result()) {
        let raw = with_outcome(raw, |o| {
            o.snoozed = None;
            o.ask_differently = None;
            o.feedback_text = None;
            o.dismissed = Some(true);
        });
        let value = compact(&raw).to_value();
        prop_assert_eq!(value.get("cancelled"), Some(&Value::Bool(true)));
        if !matches!(raw, RawResult::Form(_)) {
            prop_assert!(value.get("answer").is_none());
        }
        prop_assert!(value.get("instruction").is_none());
        prop_assert!(value.get("comment").is_none());
    }

    #[test]
    fn never_contains_null(raw in raw_result()) {
        let value = compact(&raw).to_value();
        prop_assert!(value.is_object());
        prop_assert!(!contains_null(&value));
    }

    #[test]
    fn humanize_is_total(raw in raw_result()) {
        let text = humanize(&compact(&raw));
        prop_assert!(!text.trim().is_empty());
    }
}
