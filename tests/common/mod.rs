//! Shared test helpers: canned event sequences, persisted messages, fixtures.

#![allow(dead_code)]

use std::path::Path;

use serde_json::{json, Value};

use provexec::report::{CaptureBuffer, Report};
use provexec::types::{InvocationState, Part, PersistedMessage, Role, StreamEvent};

/// A report writing into an inspectable buffer.
pub fn capture_report() -> (Report, CaptureBuffer) {
    let buf = CaptureBuffer::new();
    (Report::to_writer(buf.clone()), buf)
}

/// Parallel provider + local call, both results, then text.
pub fn healthy_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::step_start(),
        StreamEvent::tool_call("web_search"),
        StreamEvent::tool_call("get_company_info"),
        StreamEvent::tool_result("web_search", true, json!([{"title": "Anthropic"}])),
        StreamEvent::tool_result("get_company_info", false, json!({"name": "Anthropic"})),
        StreamEvent::text_delta("Anthropic..."),
    ]
}

/// Both calls issued, no results.
pub fn bailed_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::step_start(),
        StreamEvent::tool_call("web_search"),
        StreamEvent::tool_call("get_company_info"),
    ]
}

/// Web search called, answered, and called again in step 2.
pub fn reinvoked_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::step_start(),
        StreamEvent::tool_call("web_search"),
        StreamEvent::tool_result("web_search", true, json!("first")),
        StreamEvent::step_start(),
        StreamEvent::tool_call("web_search"),
        StreamEvent::tool_result("web_search", true, json!("second")),
    ]
}

/// User prompt plus an assistant message holding the web search invocation.
pub fn persisted_turn(state: InvocationState, result: Option<Value>) -> Vec<PersistedMessage> {
    vec![
        PersistedMessage::new(
            "u1",
            Role::User,
            vec![Part::text("Tell me about Anthropic. Use both tools in parallel.")],
        ),
        PersistedMessage::new(
            "a1",
            Role::Assistant,
            vec![
                Part::StepStart,
                Part::tool_invocation(
                    "srvtoolu_01",
                    "web_search_20250305",
                    state,
                    result,
                    Some(true),
                ),
                Part::tool_invocation(
                    "toolu_02",
                    "get_company_info",
                    InvocationState::Result,
                    Some(json!({"name": "Anthropic", "founded": 2021})),
                    None,
                ),
                Part::text("Anthropic is an AI safety company."),
            ],
        ),
    ]
}

/// Write `turn-N/<name>` under `root`.
pub fn write_turn_file(root: &Path, turn: usize, name: &str, contents: &str) {
    let dir = root.join(format!("turn-{turn}"));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}

/// Serialize events as a JSONL log.
pub fn to_jsonl(events: &[StreamEvent]) -> String {
    events
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}
