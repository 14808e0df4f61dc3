//! Wire (UI) messages, the shape a runtime accepts as conversational input.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString};

use super::event::{UNKNOWN_KIND, UNKNOWN_TOOL};
use super::message::{InvocationState, Part, PersistedMessage, Role};

const TOOL_PART_PREFIX: &str = "tool-";
const DYNAMIC_TOOL_PART: &str = "dynamic-tool";

/// A message in wire form, replayable as input to a later stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<UiPart>,
}

impl UiMessage {
    /// A user turn with a single text part.
    pub fn user_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            parts: vec![UiPart::Text { text: text.into() }],
        }
    }

    /// Parts describing tool activity.
    pub fn tool_parts(&self) -> impl Iterator<Item = &UiToolPart> {
        self.parts.iter().filter_map(|part| match part {
            UiPart::Tool(tool) => Some(tool),
            _ => None,
        })
    }
}

/// State of a tool part in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum UiToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
    #[strum(default)]
    Other(String),
}

impl From<&InvocationState> for UiToolState {
    fn from(state: &InvocationState) -> Self {
        match state {
            InvocationState::PartialCall => Self::InputStreaming,
            InvocationState::Call => Self::InputAvailable,
            InvocationState::Result => Self::OutputAvailable,
            InvocationState::Other(s) => Self::Other(s.clone()),
        }
    }
}

/// A tool part, typed `tool-<name>` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct UiToolPart {
    pub tool_name: String,
    pub tool_call_id: String,
    pub state: UiToolState,
    pub input: Value,
    pub output: Option<Value>,
    pub provider_executed: Option<bool>,
}

impl UiToolPart {
    pub fn wire_type(&self) -> String {
        format!("{TOOL_PART_PREFIX}{}", self.tool_name)
    }
}

/// One part of a wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum UiPart {
    Text { text: String },
    Reasoning { text: String },
    StepStart,
    Tool(UiToolPart),
    Other { kind: String, raw: Value },
}

impl UiPart {
    pub fn kind(&self) -> String {
        match self {
            Self::Text { .. } => "text".to_string(),
            Self::Reasoning { .. } => "reasoning".to_string(),
            Self::StepStart => "step-start".to_string(),
            Self::Tool(tool) => tool.wire_type(),
            Self::Other { kind, .. } => kind.clone(),
        }
    }
}

impl From<Value> for UiPart {
    fn from(raw: Value) -> Self {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_KIND)
            .to_string();
        let text = || {
            raw.get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match kind.as_str() {
            "text" => Self::Text { text: text() },
            "reasoning" => Self::Reasoning { text: text() },
            "step-start" => Self::StepStart,
            k if k == DYNAMIC_TOOL_PART || k.starts_with(TOOL_PART_PREFIX) => {
                let tool_name = if k == DYNAMIC_TOOL_PART {
                    raw.get("toolName")
                        .and_then(Value::as_str)
                        .unwrap_or(UNKNOWN_TOOL)
                        .to_string()
                } else {
                    k[TOOL_PART_PREFIX.len()..].to_string()
                };
                Self::Tool(UiToolPart {
                    tool_name,
                    tool_call_id: raw
                        .get("toolCallId")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    state: raw
                        .get("state")
                        .and_then(Value::as_str)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| UiToolState::Other("undefined".to_string())),
                    input: raw.get("input").cloned().unwrap_or(Value::Null),
                    output: raw.get("output").filter(|v| !v.is_null()).cloned(),
                    provider_executed: raw.get("providerExecuted").and_then(Value::as_bool),
                })
            }
            _ => Self::Other { kind, raw },
        }
    }
}

impl From<UiPart> for Value {
    fn from(part: UiPart) -> Self {
        match part {
            UiPart::Text { text } => json!({ "type": "text", "text": text }),
            UiPart::Reasoning { text } => json!({ "type": "reasoning", "text": text }),
            UiPart::StepStart => json!({ "type": "step-start" }),
            UiPart::Tool(tool) => {
                let mut value = json!({
                    "type": tool.wire_type(),
                    "toolCallId": tool.tool_call_id,
                    "state": tool.state.to_string(),
                    "input": tool.input,
                });
                if let Some(output) = tool.output {
                    value["output"] = output;
                }
                if let Some(flag) = tool.provider_executed {
                    value["providerExecuted"] = Value::Bool(flag);
                }
                value
            }
            UiPart::Other { raw, .. } => raw,
        }
    }
}

/// Project persisted messages into wire messages for replay.
///
/// Messages whose content has no parts array become a single text part when
/// the raw content is a string, and an empty part list otherwise.
pub fn project_ui(messages: &[PersistedMessage]) -> Vec<UiMessage> {
    messages
        .iter()
        .map(|msg| {
            let parts = match msg.parts() {
                Some(parts) => parts.iter().map(project_part).collect(),
                None => match msg.content.raw.as_str() {
                    Some(text) => vec![UiPart::Text {
                        text: text.to_string(),
                    }],
                    None => Vec::new(),
                },
            };
            UiMessage {
                id: msg.id.clone(),
                role: msg.role,
                parts,
            }
        })
        .collect()
}

const SOURCE_URL_KIND: &str = "source-url";

fn project_part(part: &Part) -> UiPart {
    match part {
        Part::ToolInvocation {
            invocation,
            provider_executed,
        } => UiPart::Tool(UiToolPart {
            tool_name: invocation.tool_name.clone(),
            tool_call_id: invocation.tool_call_id.clone(),
            state: UiToolState::from(&invocation.state),
            input: invocation.args.clone(),
            output: invocation.result.clone(),
            provider_executed: *provider_executed,
        }),
        Part::Text { text } => UiPart::Text { text: text.clone() },
        Part::Reasoning { text } => UiPart::Reasoning { text: text.clone() },
        Part::StepStart => UiPart::StepStart,
        Part::Source(raw) => {
            let mut raw = raw.clone();
            if let Some(fields) = raw.as_object_mut() {
                fields.insert("type".to_string(), Value::from(SOURCE_URL_KIND));
            }
            UiPart::Other {
                kind: SOURCE_URL_KIND.to_string(),
                raw,
            }
        }
        Part::Other { kind, raw } => UiPart::Other {
            kind: kind.clone(),
            raw: raw.clone(),
        },
    }
}
