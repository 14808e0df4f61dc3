//! Reproduction scenarios.
//!
//! Each scenario drives an [`AgentRuntime`] through a parallel tool call,
//! classifies the stream, and records named checks on a [`Report`]. Symptoms
//! become failed checks; only setup and environment problems are errors.

pub mod agents;
pub mod bail;
pub mod reinvoke;
pub mod resume;

use std::sync::Arc;

use bon::Builder;
use strum::{Display, EnumString};

use crate::classify::{drain, Classification, StreamClassifier, ToolNamePredicate};
use crate::config::{
    ProbeConfig, DEFAULT_ERROR_CHARS, DEFAULT_MAX_STEPS, DEFAULT_MODEL, DEFAULT_PREVIEW_CHARS,
    DEFAULT_RESUME_MAX_STEPS,
};
use crate::error::Result;
use crate::report::Report;
use crate::runtime::{AgentInput, AgentRuntime, AgentSpec, MessageList, StreamOptions};

/// First-turn prompt shared by every scenario.
pub const PROMPT: &str = "Tell me about Anthropic. Use both tools in parallel.";

/// Follow-up user turn appended to the replayed history.
pub const FOLLOW_UP_ID: &str = "follow-up";
pub const FOLLOW_UP_TEXT: &str = "What year was Anthropic founded?";

/// Knobs shared by the scenarios.
#[derive(Debug, Clone, Builder)]
pub struct ScenarioSettings {
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub model: String,
    #[builder(default = DEFAULT_MAX_STEPS)]
    pub max_steps: u32,
    #[builder(default = DEFAULT_RESUME_MAX_STEPS)]
    pub resume_max_steps: u32,
    #[builder(default)]
    pub predicate: ToolNamePredicate,
    #[builder(default = DEFAULT_PREVIEW_CHARS)]
    pub preview_chars: usize,
    #[builder(default = DEFAULT_ERROR_CHARS)]
    pub error_chars: usize,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScenarioSettings {
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            model: config.model.clone(),
            max_steps: config.max_steps,
            resume_max_steps: config.resume_max_steps,
            predicate: ToolNamePredicate::parse(&config.provider_tool)?,
            preview_chars: config.preview_chars,
            error_chars: config.error_chars,
        })
    }
}

/// Which scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Scenario {
    /// Single check: the stream delivered at least one tool result.
    Bail,
    /// Bail check plus cross-step re-invocation of the provider tool.
    Reinvoke,
    /// Persisted-state checks and a resumed follow-up turn.
    Resume,
}

impl Scenario {
    pub async fn run(
        self,
        runtime: &dyn AgentRuntime,
        settings: &ScenarioSettings,
        report: &mut Report,
    ) -> Result<()> {
        tracing::info!(scenario = %self, model = %settings.model, "starting scenario");
        match self {
            Self::Bail => bail::run(runtime, settings, report).await.map(drop),
            Self::Reinvoke => reinvoke::run(runtime, settings, report).await.map(drop),
            Self::Resume => resume::run(runtime, settings, report).await,
        }
    }
}

/// A drained invocation.
pub struct Turn {
    pub classification: Classification,
    pub messages: Arc<dyn MessageList>,
}

impl std::fmt::Debug for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Turn")
            .field("classification", &self.classification)
            .finish_non_exhaustive()
    }
}

/// Invoke `agent` and drain its stream. Invocation and stream errors propagate.
pub async fn run_turn(
    runtime: &dyn AgentRuntime,
    agent: &AgentSpec,
    input: AgentInput,
    max_steps: u32,
    preview_chars: usize,
) -> Result<Turn> {
    let options = StreamOptions::builder().max_steps(max_steps).build();
    let response = runtime.stream(agent, input, options).await?;

    let mut classifier = StreamClassifier::with_preview_chars(preview_chars);
    drain(response.full_stream, &mut classifier).await?;
    let classification = classifier.finish();
    tracing::info!(
        agent = %agent.id,
        steps = classification.step_count,
        events = classification.event_count(),
        "stream drained"
    );

    Ok(Turn {
        classification,
        messages: response.message_list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn scenario_names_round_trip() {
        assert_eq!(Scenario::from_str("reinvoke").unwrap(), Scenario::Reinvoke);
        assert_eq!(Scenario::Resume.to_string(), "resume");
        assert!(Scenario::from_str("other").is_err());
    }

    #[test]
    fn settings_follow_config() {
        let mut config = ProbeConfig::default();
        config.max_steps = 7;
        config.provider_tool = "re:^web_search_\\d+$".to_string();

        let settings = ScenarioSettings::from_config(&config).unwrap();
        assert_eq!(settings.max_steps, 7);
        assert!(settings.predicate.matches("web_search_20250305"));
        assert!(!settings.predicate.matches("my_web_search"));
    }

    #[test]
    fn invalid_predicate_is_an_error() {
        let mut config = ProbeConfig::default();
        config.provider_tool = "re:(".to_string();
        assert!(ScenarioSettings::from_config(&config).is_err());
    }
}
