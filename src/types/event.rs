//! Stream event types.
//!
//! Events arrive from the agent runtime as loosely-shaped JSON objects, either
//! `{ "type": ..., "payload": { ... } }` or flat `{ "type": ..., ...fields }`.
//! Conversion into [`StreamEvent`] never fails: unknown kinds become
//! [`StreamEvent::Other`] and missing fields take empty defaults.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

/// Kind label used when an event has no readable `type`.
pub const UNKNOWN_KIND: &str = "unknown";

/// Placeholder tool name when an event omits it.
pub const UNKNOWN_TOOL: &str = "unknown";

/// Event kinds the classifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum StreamEventKind {
    StepStart,
    ToolCall,
    ToolResult,
    TextDelta,
}

impl StreamEventKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A single event from a runtime's full stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum StreamEvent {
    StepStart,
    ToolCall(ToolCallEvent),
    ToolResult(ToolResultEvent),
    TextDelta { text: String },
    /// Any other event kind, kept only for diagnostics.
    Other { kind: String, payload: Value },
}

/// Payload of a `tool-call` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallEvent {
    pub tool_call_id: Option<String>,
    pub tool_name: String,
    pub args: Value,
    pub provider_executed: bool,
}

/// Payload of a `tool-result` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultEvent {
    pub tool_call_id: Option<String>,
    pub tool_name: String,
    pub result: Value,
    pub provider_executed: bool,
}

impl StreamEvent {
    pub fn step_start() -> Self {
        Self::StepStart
    }

    pub fn tool_call(tool_name: impl Into<String>) -> Self {
        Self::ToolCall(ToolCallEvent {
            tool_call_id: None,
            tool_name: tool_name.into(),
            args: Value::Null,
            provider_executed: false,
        })
    }

    pub fn tool_result(
        tool_name: impl Into<String>,
        provider_executed: bool,
        result: Value,
    ) -> Self {
        Self::ToolResult(ToolResultEvent {
            tool_call_id: None,
            tool_name: tool_name.into(),
            result,
            provider_executed,
        })
    }

    pub fn text_delta(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    pub fn other(kind: impl Into<String>) -> Self {
        Self::Other {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    /// The wire label of this event's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::StepStart => StreamEventKind::StepStart.as_str(),
            Self::ToolCall(_) => StreamEventKind::ToolCall.as_str(),
            Self::ToolResult(_) => StreamEventKind::ToolResult.as_str(),
            Self::TextDelta { .. } => StreamEventKind::TextDelta.as_str(),
            Self::Other { kind, .. } => kind.as_str(),
        }
    }

    /// Parse one line of a JSONL event log. Unparseable lines become an
    /// `unknown` event instead of an error.
    pub fn parse_line(line: &str) -> Self {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => Self::from(value),
            Err(e) => {
                tracing::warn!(error = %e, "unparseable stream event line");
                Self::Other {
                    kind: UNKNOWN_KIND.to_string(),
                    payload: Value::String(line.to_string()),
                }
            }
        }
    }
}

fn str_field(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn value_field(payload: &Value, keys: &[&str]) -> Value {
    keys.iter()
        .find_map(|key| payload.get(*key))
        .cloned()
        .unwrap_or(Value::Null)
}

fn flag_field(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(Value::as_bool).unwrap_or(false)
}

impl From<Value> for StreamEvent {
    fn from(value: Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_KIND)
            .to_string();
        let payload = value
            .get("payload")
            .filter(|p| p.is_object())
            .unwrap_or(&value);

        match kind.parse::<StreamEventKind>() {
            Ok(StreamEventKind::StepStart) => Self::StepStart,
            Ok(StreamEventKind::ToolCall) => Self::ToolCall(ToolCallEvent {
                tool_call_id: str_field(payload, &["toolCallId"]),
                tool_name: str_field(payload, &["toolName"])
                    .unwrap_or_else(|| UNKNOWN_TOOL.to_string()),
                args: value_field(payload, &["args", "input"]),
                provider_executed: flag_field(payload, "providerExecuted"),
            }),
            Ok(StreamEventKind::ToolResult) => Self::ToolResult(ToolResultEvent {
                tool_call_id: str_field(payload, &["toolCallId"]),
                tool_name: str_field(payload, &["toolName"])
                    .unwrap_or_else(|| UNKNOWN_TOOL.to_string()),
                result: value_field(payload, &["result", "output"]),
                provider_executed: flag_field(payload, "providerExecuted"),
            }),
            Ok(StreamEventKind::TextDelta) => Self::TextDelta {
                text: str_field(payload, &["text", "textDelta", "delta"]).unwrap_or_default(),
            },
            Err(_) => Self::Other {
                payload: value.get("payload").cloned().unwrap_or(Value::Null),
                kind,
            },
        }
    }
}

impl From<StreamEvent> for Value {
    fn from(event: StreamEvent) -> Self {
        let kind = event.kind().to_string();
        let payload = match event {
            StreamEvent::StepStart => Value::Object(Map::new()),
            StreamEvent::ToolCall(call) => {
                let mut payload = json!({
                    "toolName": call.tool_name,
                    "args": call.args,
                    "providerExecuted": call.provider_executed,
                });
                if let Some(id) = call.tool_call_id {
                    payload["toolCallId"] = Value::String(id);
                }
                payload
            }
            StreamEvent::ToolResult(result) => {
                let mut payload = json!({
                    "toolName": result.tool_name,
                    "result": result.result,
                    "providerExecuted": result.provider_executed,
                });
                if let Some(id) = result.tool_call_id {
                    payload["toolCallId"] = Value::String(id);
                }
                payload
            }
            StreamEvent::TextDelta { text } => json!({ "text": text }),
            StreamEvent::Other { payload, .. } => payload,
        };
        json!({ "type": kind, "payload": payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_payload_shaped_tool_result() {
        let event = StreamEvent::from(json!({
            "type": "tool-result",
            "payload": {
                "toolCallId": "srvtoolu_01",
                "toolName": "web_search_20250305",
                "result": [{"url": "https://www.anthropic.com"}],
                "providerExecuted": true
            }
        }));

        match event {
            StreamEvent::ToolResult(result) => {
                assert_eq!(result.tool_call_id.as_deref(), Some("srvtoolu_01"));
                assert_eq!(result.tool_name, "web_search_20250305");
                assert!(result.provider_executed);
                assert_eq!(result.result[0]["url"], "https://www.anthropic.com");
            }
            other => panic!("expected ToolResult, got {other:?}"),
        }
    }

    #[test]
    fn parses_flat_text_delta() {
        let event = StreamEvent::from(json!({"type": "text-delta", "textDelta": "Anthropic"}));
        assert_eq!(event, StreamEvent::text_delta("Anthropic"));
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let event = StreamEvent::from(json!({"type": "tool-call"}));
        match event {
            StreamEvent::ToolCall(call) => {
                assert_eq!(call.tool_name, UNKNOWN_TOOL);
                assert!(call.tool_call_id.is_none());
                assert!(!call.provider_executed);
            }
            other => panic!("expected ToolCall, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kinds_are_preserved() {
        let event = StreamEvent::from(json!({"type": "finish", "payload": {"reason": "stop"}}));
        assert_eq!(event.kind(), "finish");
        assert!(matches!(event, StreamEvent::Other { .. }));
    }

    #[test]
    fn missing_type_is_unknown() {
        let event = StreamEvent::from(json!({"payload": {}}));
        assert_eq!(event.kind(), UNKNOWN_KIND);
    }

    #[test]
    fn garbage_line_is_unknown_event() {
        let event = StreamEvent::parse_line("{not json");
        assert_eq!(event.kind(), UNKNOWN_KIND);
    }

    #[test]
    fn serializes_back_to_payload_shape() {
        let value = serde_json::to_value(StreamEvent::tool_call("get_company_info")).unwrap();
        assert_eq!(value["type"], "tool-call");
        assert_eq!(value["payload"]["toolName"], "get_company_info");
        let back: StreamEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, StreamEvent::tool_call("get_company_info"));
    }
}
