//! Convenience re-exports for common use.

pub use crate::classify::{
    classify, count_results, detect_reinvocation, Classification, StreamClassifier,
    ToolNamePredicate,
};
pub use crate::config::ProbeConfig;
pub use crate::correlate::{correlate_persisted, PersistedCorrelation};
pub use crate::error::{ProbeError, Result};
pub use crate::report::{evaluate, ExitSignal, Report, TestResult};
pub use crate::runtime::{
    AgentInput, AgentResponse, AgentRuntime, AgentSpec, MessageList, ReplayRuntime,
    ScriptedRuntime, ScriptedTurn, StreamOptions, Tool, ToolRegistry,
};
pub use crate::scenario::{Scenario, ScenarioSettings};
pub use crate::types::{PersistedMessage, StreamEvent, UiMessage};
