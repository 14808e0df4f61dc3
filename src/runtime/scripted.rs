//! In-memory runtime driven by queued turns.
//!
//! Each call to [`AgentRuntime::stream`] pops the next [`ScriptedTurn`]. Local
//! tool calls in a script are executed against the agent's registry, so a
//! turn exercises the same tool code a live runtime would.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::tools::ToolArguments;
use super::{
    AgentInput, AgentResponse, AgentRuntime, AgentSpec, MessageSnapshot, StreamOptions,
};
use crate::error::{ProbeError, Result};
use crate::types::{PersistedMessage, StreamEvent, ToolCallEvent, ToolResultEvent, UiMessage};

/// One scripted stream item.
#[derive(Debug, Clone)]
pub enum ScriptItem {
    /// Yield the event as-is.
    Emit(StreamEvent),
    /// Yield a `tool-call`, run the local tool, then yield its `tool-result`
    /// (or a `tool-error` event when the tool fails).
    CallLocal { id: String, name: String, args: Value },
    /// End the stream with an error.
    Fail(String),
}

/// Everything one invocation produces.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    items: Vec<ScriptItem>,
    snapshot: MessageSnapshot,
    rejection: Option<String>,
}

impl ScriptedTurn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(mut self, event: StreamEvent) -> Self {
        self.items.push(ScriptItem::Emit(event));
        self
    }

    pub fn events(mut self, events: impl IntoIterator<Item = StreamEvent>) -> Self {
        self.items.extend(events.into_iter().map(ScriptItem::Emit));
        self
    }

    pub fn call_local(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        args: Value,
    ) -> Self {
        self.items.push(ScriptItem::CallLocal {
            id: id.into(),
            name: name.into(),
            args,
        });
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.items.push(ScriptItem::Fail(message.into()));
        self
    }

    /// Persisted messages visible after the stream.
    pub fn with_messages(mut self, db: Vec<PersistedMessage>) -> Self {
        self.snapshot = MessageSnapshot::new(db);
        self
    }

    /// Explicit wire form; call after [`Self::with_messages`].
    pub fn with_ui(mut self, ui: Vec<UiMessage>) -> Self {
        self.snapshot = self.snapshot.with_ui(ui);
        self
    }

    /// Refuse the invocation before any stream exists.
    pub fn reject(mut self, message: impl Into<String>) -> Self {
        self.rejection = Some(message.into());
        self
    }
}

/// One invocation as the runtime received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub agent_id: String,
    pub input: AgentInput,
    pub options: StreamOptions,
}

/// Runtime replaying queued [`ScriptedTurn`]s in order.
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_turn(self, turn: ScriptedTurn) -> Self {
        self.push_turn(turn);
        self
    }

    pub fn push_turn(&self, turn: ScriptedTurn) {
        lock(&self.turns).push_back(turn);
    }

    pub fn remaining_turns(&self) -> usize {
        lock(&self.turns).len()
    }

    /// Invocations received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn stream(
        &self,
        agent: &AgentSpec,
        input: AgentInput,
        options: StreamOptions,
    ) -> Result<AgentResponse> {
        tracing::debug!(
            agent = %agent.id,
            messages = input.message_count(),
            max_steps = options.max_steps,
            "scripted invocation"
        );
        lock(&self.calls).push(RecordedCall {
            agent_id: agent.id.clone(),
            input,
            options,
        });

        let turn = lock(&self.turns)
            .pop_front()
            .ok_or_else(|| ProbeError::Runtime(format!("no scripted turn left for {}", agent.id)))?;
        if let Some(message) = turn.rejection {
            return Err(ProbeError::Runtime(message));
        }

        let tools = agent.tools.clone();
        let items = turn.items;
        let full_stream = async_stream::stream! {
            for item in items {
                match item {
                    ScriptItem::Emit(event) => {
                        yield Ok(event);
                    }
                    ScriptItem::CallLocal { id, name, args } => {
                        yield Ok(StreamEvent::ToolCall(ToolCallEvent {
                            tool_call_id: Some(id.clone()),
                            tool_name: name.clone(),
                            args: args.clone(),
                            provider_executed: false,
                        }));
                        match tools.execute_local(&name, &ToolArguments::new(args)).await {
                            Ok(result) => {
                                yield Ok(StreamEvent::ToolResult(ToolResultEvent {
                                    tool_call_id: Some(id),
                                    tool_name: name,
                                    result,
                                    provider_executed: false,
                                }));
                            }
                            Err(e) => {
                                tracing::debug!(tool = %name, error = %e, "local tool failed");
                                yield Ok(StreamEvent::Other {
                                    kind: "tool-error".to_string(),
                                    payload: json!({
                                        "toolCallId": id,
                                        "toolName": name,
                                        "error": e.to_string(),
                                    }),
                                });
                            }
                        }
                    }
                    ScriptItem::Fail(message) => {
                        yield Err(ProbeError::Stream(message));
                        break;
                    }
                }
            }
        };

        Ok(AgentResponse {
            full_stream: Box::pin(full_stream),
            message_list: Arc::new(turn.snapshot),
        })
    }
}
