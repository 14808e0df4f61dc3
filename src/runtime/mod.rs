//! The agent runtime seam.
//!
//! A runtime runs a multi-step tool-using agent and exposes two things per
//! invocation: a full event stream and a view of the messages it persisted.
//! Probes depend only on [`AgentRuntime`]; concrete runtimes are
//! [`ScriptedRuntime`] (in-memory) and [`ReplayRuntime`] (recorded fixtures).

pub mod replay;
pub mod scripted;
pub mod tools;

pub use replay::ReplayRuntime;
pub use scripted::{ScriptItem, ScriptedRuntime, ScriptedTurn};
pub use tools::{LocalTool, Tool, ToolArguments, ToolParameters, ToolRegistry, ToolSpec};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bon::Builder;
use futures::stream::BoxStream;

use crate::config::DEFAULT_MAX_STEPS;
use crate::error::Result;
use crate::types::{project_ui, PersistedMessage, StreamEvent, UiMessage};

/// Agent definition handed to a runtime.
#[derive(Debug, Clone, Builder)]
pub struct AgentSpec {
    #[builder(into)]
    pub id: String,
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    pub instructions: String,
    #[builder(default)]
    pub tools: ToolRegistry,
}

/// Input for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentInput {
    Prompt(String),
    /// Prior conversation in wire form, newest last.
    Messages(Vec<UiMessage>),
}

impl AgentInput {
    pub fn message_count(&self) -> usize {
        match self {
            Self::Prompt(_) => 1,
            Self::Messages(messages) => messages.len(),
        }
    }
}

/// Per-invocation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct StreamOptions {
    #[builder(default = DEFAULT_MAX_STEPS)]
    pub max_steps: u32,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Read access to what a runtime persisted for an invocation.
///
/// Callers read it after the stream has been drained.
pub trait MessageList: Send + Sync {
    /// Messages as stored (database form).
    fn db(&self) -> Vec<PersistedMessage>;

    /// Messages in wire form, suitable as input to a later invocation.
    fn ui(&self) -> Vec<UiMessage>;
}

/// A fixed [`MessageList`]. Without an explicit wire form, `ui()` is the
/// projection of the persisted messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageSnapshot {
    db: Vec<PersistedMessage>,
    ui: Option<Vec<UiMessage>>,
}

impl MessageSnapshot {
    pub fn new(db: Vec<PersistedMessage>) -> Self {
        Self { db, ui: None }
    }

    pub fn with_ui(mut self, ui: Vec<UiMessage>) -> Self {
        self.ui = Some(ui);
        self
    }
}

impl MessageList for MessageSnapshot {
    fn db(&self) -> Vec<PersistedMessage> {
        self.db.clone()
    }

    fn ui(&self) -> Vec<UiMessage> {
        match &self.ui {
            Some(ui) => ui.clone(),
            None => project_ui(&self.db),
        }
    }
}

/// What an invocation hands back.
pub struct AgentResponse {
    pub full_stream: BoxStream<'static, Result<StreamEvent>>,
    pub message_list: Arc<dyn MessageList>,
}

impl fmt::Debug for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentResponse").finish_non_exhaustive()
    }
}

/// Runs an agent and exposes its full event stream and persisted messages.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Start an invocation.
    ///
    /// An `Err` means the invocation could not start at all; failures after
    /// that arrive as `Err` items on the stream.
    async fn stream(
        &self,
        agent: &AgentSpec,
        input: AgentInput,
        options: StreamOptions,
    ) -> Result<AgentResponse>;
}
