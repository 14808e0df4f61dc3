//! Re-invocation check: the provider tool must not be called again in a
//! later step once it has been called.

use crate::classify::{detect_reinvocation, Classification, ToolNamePredicate};
use crate::error::Result;
use crate::report::{diagnostics, Report};
use crate::runtime::{AgentInput, AgentRuntime};

use super::bail::check_results_received;
use super::{agents, run_turn, ScenarioSettings, PROMPT};

pub const CHECK_NO_REINVOCATION: &str = "no-provider-tool-reinvocation";

pub async fn run(
    runtime: &dyn AgentRuntime,
    settings: &ScenarioSettings,
    report: &mut Report,
) -> Result<Classification> {
    let agent = agents::repro(&settings.model);
    let turn = run_turn(
        runtime,
        &agent,
        AgentInput::Prompt(PROMPT.to_string()),
        settings.max_steps,
        settings.preview_chars,
    )
    .await?;
    let classification = turn.classification;

    diagnostics::histogram(report, &classification);
    diagnostics::steps(report, &classification);
    diagnostics::text_preview(report, &classification);

    check_results_received(report, &classification);
    check_no_reinvocation(report, &classification, &settings.predicate);
    Ok(classification)
}

/// Fails when a later step calls a matching tool that an earlier step
/// already called, even if every call got a result.
pub fn check_no_reinvocation(
    report: &mut Report,
    classification: &Classification,
    predicate: &ToolNamePredicate,
) -> bool {
    let reinvoked = detect_reinvocation(classification, predicate);
    let detail = if reinvoked.is_empty() {
        format!("no tool {predicate} called again after its first step")
    } else {
        let steps: Vec<String> = reinvoked.iter().map(usize::to_string).collect();
        format!("tool {predicate} re-invoked in step(s) {}", steps.join(", "))
    };
    report
        .assert(CHECK_NO_REINVOCATION, reinvoked.is_empty(), detail)
        .pass
}
