//! Persisted message snapshots exposed by an agent runtime after a stream.
//!
//! The persisted shape may diverge from the live event stream; detecting that
//! divergence is the point of the resume scenario.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

use super::event::UNKNOWN_TOOL;

/// Conversation role.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A message as stored by the runtime's persistence layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: MessageContent,
}

impl PersistedMessage {
    /// Create a message with structured parts.
    pub fn new(id: impl Into<String>, role: Role, parts: Vec<Part>) -> Self {
        Self {
            id: id.into(),
            role,
            content: MessageContent::from_parts(parts),
        }
    }

    /// Structured parts, if the content carries a parts array.
    pub fn parts(&self) -> Option<&[Part]> {
        self.content.parts.as_deref()
    }
}

/// Message content: a `parts` array when structured, with the raw value kept
/// for diagnostics when it is not.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct MessageContent {
    pub parts: Option<Vec<Part>>,
    pub raw: Value,
}

impl MessageContent {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            parts: Some(parts),
            raw: json!({ "format": 2 }),
        }
    }
}

impl From<Value> for MessageContent {
    fn from(raw: Value) -> Self {
        let parts = raw
            .get("parts")
            .and_then(Value::as_array)
            .map(|parts| parts.iter().cloned().map(Part::from).collect());
        Self { parts, raw }
    }
}

impl From<MessageContent> for Value {
    fn from(content: MessageContent) -> Self {
        let Some(parts) = content.parts else {
            return content.raw;
        };
        let mut object = match content.raw {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        object.insert(
            "parts".to_string(),
            Value::Array(parts.into_iter().map(Value::from).collect()),
        );
        Value::Object(object)
    }
}

/// Lifecycle state of a persisted tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum InvocationState {
    PartialCall,
    Call,
    Result,
    #[strum(default)]
    Other(String),
}

/// A tool invocation recorded inside an assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub tool_name: String,
    pub state: InvocationState,
    pub args: Value,
    /// `None` when absent or JSON `null`.
    pub result: Option<Value>,
}

impl ToolInvocation {
    /// Reached the terminal state with a non-null result.
    pub fn has_result(&self) -> bool {
        self.state == InvocationState::Result && self.result.is_some()
    }
}

/// Part kinds with a fixed wire label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum PartKind {
    ToolInvocation,
    Source,
    Text,
    Reasoning,
    StepStart,
}

impl PartKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One part of persisted message content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    ToolInvocation {
        invocation: ToolInvocation,
        /// Explicit flag; `None` when the part does not carry one.
        provider_executed: Option<bool>,
    },
    Source(Value),
    Text {
        text: String,
    },
    Reasoning {
        text: String,
    },
    StepStart,
    Other {
        kind: String,
        raw: Value,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_invocation(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        state: InvocationState,
        result: Option<Value>,
        provider_executed: Option<bool>,
    ) -> Self {
        Self::ToolInvocation {
            invocation: ToolInvocation {
                tool_call_id: tool_call_id.into(),
                tool_name: tool_name.into(),
                state,
                args: Value::Null,
                result,
            },
            provider_executed,
        }
    }

    /// The wire label of this part's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::ToolInvocation { .. } => PartKind::ToolInvocation.as_str(),
            Self::Source(_) => PartKind::Source.as_str(),
            Self::Text { .. } => PartKind::Text.as_str(),
            Self::Reasoning { .. } => PartKind::Reasoning.as_str(),
            Self::StepStart => PartKind::StepStart.as_str(),
            Self::Other { kind, .. } => kind.as_str(),
        }
    }
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

impl From<Value> for Part {
    fn from(raw: Value) -> Self {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(super::event::UNKNOWN_KIND)
            .to_string();

        match kind.parse::<PartKind>() {
            Ok(PartKind::ToolInvocation) => {
                let inv = raw.get("toolInvocation").unwrap_or(&Value::Null);
                let state = inv
                    .get("state")
                    .and_then(Value::as_str)
                    .map(|s| s.parse().unwrap_or_else(|_| InvocationState::Other(s.to_string())))
                    .unwrap_or_else(|| InvocationState::Other("undefined".to_string()));
                let provider_executed = raw
                    .get("providerExecuted")
                    .or_else(|| inv.get("providerExecuted"))
                    .and_then(Value::as_bool);
                Self::ToolInvocation {
                    invocation: ToolInvocation {
                        tool_call_id: inv
                            .get("toolCallId")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        tool_name: inv
                            .get("toolName")
                            .and_then(Value::as_str)
                            .unwrap_or(UNKNOWN_TOOL)
                            .to_string(),
                        state,
                        args: inv.get("args").cloned().unwrap_or(Value::Null),
                        result: non_null(inv.get("result")),
                    },
                    provider_executed,
                }
            }
            Ok(PartKind::Source) => Self::Source(raw),
            Ok(PartKind::Text) => Self::Text {
                text: raw.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
            },
            Ok(PartKind::Reasoning) => Self::Reasoning {
                text: raw
                    .get("reasoning")
                    .or_else(|| raw.get("text"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            Ok(PartKind::StepStart) => Self::StepStart,
            Err(_) => Self::Other { kind, raw },
        }
    }
}

impl From<Part> for Value {
    fn from(part: Part) -> Self {
        match part {
            Part::ToolInvocation {
                invocation,
                provider_executed,
            } => {
                let mut inv = json!({
                    "toolCallId": invocation.tool_call_id,
                    "toolName": invocation.tool_name,
                    "state": invocation.state.to_string(),
                    "args": invocation.args,
                });
                if let Some(result) = invocation.result {
                    inv["result"] = result;
                }
                let mut value = json!({ "type": "tool-invocation", "toolInvocation": inv });
                if let Some(flag) = provider_executed {
                    value["providerExecuted"] = Value::Bool(flag);
                }
                value
            }
            Part::Source(raw) | Part::Other { raw, .. } => raw,
            Part::Text { text } => json!({ "type": "text", "text": text }),
            Part::Reasoning { text } => json!({ "type": "reasoning", "reasoning": text }),
            Part::StepStart => json!({ "type": "step-start" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_persisted_tool_invocation() {
        let msg: PersistedMessage = serde_json::from_value(json!({
            "id": "msg-1",
            "role": "assistant",
            "content": {
                "format": 2,
                "parts": [
                    {"type": "step-start"},
                    {
                        "type": "tool-invocation",
                        "providerExecuted": true,
                        "toolInvocation": {
                            "state": "call",
                            "toolCallId": "srvtoolu_01",
                            "toolName": "web_search_20250305",
                            "args": {"query": "Anthropic"}
                        }
                    }
                ]
            }
        }))
        .unwrap();

        assert_eq!(msg.role, Role::Assistant);
        let parts = msg.parts().unwrap();
        assert_eq!(parts.len(), 2);
        match &parts[1] {
            Part::ToolInvocation {
                invocation,
                provider_executed,
            } => {
                assert_eq!(invocation.state, InvocationState::Call);
                assert_eq!(*provider_executed, Some(true));
                assert!(invocation.result.is_none());
                assert!(!invocation.has_result());
            }
            other => panic!("expected tool invocation, got {other:?}"),
        }
    }

    #[test]
    fn null_result_counts_as_missing() {
        let part = Part::from(json!({
            "type": "tool-invocation",
            "toolInvocation": {"state": "result", "toolName": "web_search", "result": null}
        }));
        let Part::ToolInvocation { invocation, .. } = part else {
            panic!("expected tool invocation");
        };
        assert_eq!(invocation.state, InvocationState::Result);
        assert!(!invocation.has_result());
    }

    #[test]
    fn unknown_state_is_kept_verbatim() {
        let part = Part::from(json!({
            "type": "tool-invocation",
            "toolInvocation": {"state": "output-error", "toolName": "web_search"}
        }));
        let Part::ToolInvocation { invocation, .. } = part else {
            panic!("expected tool invocation");
        };
        assert_eq!(invocation.state.to_string(), "output-error");
    }

    #[test]
    fn string_content_has_no_parts() {
        let msg: PersistedMessage = serde_json::from_value(json!({
            "id": "msg-0",
            "role": "user",
            "content": "Tell me about Anthropic."
        }))
        .unwrap();
        assert!(msg.parts().is_none());
        assert_eq!(msg.content.raw, json!("Tell me about Anthropic."));
    }

    #[test]
    fn unknown_role_and_part_kind_degrade() {
        let msg: PersistedMessage = serde_json::from_value(json!({
            "role": "narrator",
            "content": {"parts": [{"type": "file", "url": "x"}]}
        }))
        .unwrap();
        assert_eq!(msg.role, Role::Unknown);
        assert_eq!(msg.parts().unwrap()[0].kind(), "file");
    }
}
