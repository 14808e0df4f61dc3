//! Classifier and correlator properties over canned sessions.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;
use provexec::prelude::*;
use provexec::types::InvocationState;

#[test]
fn healthy_session_has_results_and_no_reinvocation() {
    let c = classify(&healthy_events());
    assert_eq!(count_results(&c), 2);
    assert!(detect_reinvocation(&c, &ToolNamePredicate::default()).is_empty());
    assert_eq!(evaluate(&[]), ExitSignal::Success);
}

#[test]
fn bailed_session_has_no_results() {
    let c = classify(&bailed_events());
    assert_eq!(count_results(&c), 0);
    assert_eq!(c.call_count(), 2);
}

#[test]
fn reinvoked_session_is_flagged_in_step_two() {
    let c = classify(&reinvoked_events());
    assert_eq!(count_results(&c), 2);
    assert_eq!(detect_reinvocation(&c, &ToolNamePredicate::default()), vec![2]);
}

#[test]
fn regex_predicate_narrows_matches() {
    let c = classify(&reinvoked_events());
    let versioned = ToolNamePredicate::parse("re:^web_search_\\d+$").unwrap();
    assert!(detect_reinvocation(&c, &versioned).is_empty());
}

#[test]
fn classification_is_deterministic() {
    let events = reinvoked_events();
    assert_eq!(classify(&events), classify(&events));
}

#[test]
fn persisted_result_is_correlated() {
    let messages = persisted_turn(InvocationState::Result, Some(json!([{"url": "https://a"}])));
    let c = correlate_persisted(&messages, &ToolNamePredicate::default());
    assert_eq!(
        c,
        PersistedCorrelation {
            found: true,
            state: "result".into(),
            has_result: true,
            tool_call_id: "srvtoolu_01".into(),
        }
    );
}

#[test]
fn persisted_messages_survive_json_round_trip() {
    let messages = persisted_turn(InvocationState::Call, None);
    let raw = serde_json::to_string(&messages).unwrap();
    let back: Vec<PersistedMessage> = serde_json::from_str(&raw).unwrap();
    for (restored, original) in back.iter().zip(&messages) {
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.role, original.role);
        assert_eq!(restored.parts(), original.parts());
    }
}
