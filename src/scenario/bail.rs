//! Stream-bail check: a parallel provider + local tool call must yield at
//! least one tool result.

use crate::classify::{count_results, Classification};
use crate::error::Result;
use crate::report::{diagnostics, Report};
use crate::runtime::{AgentInput, AgentRuntime};

use super::{agents, run_turn, ScenarioSettings, PROMPT};

pub const CHECK_RESULTS_RECEIVED: &str = "tool-results-received";

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

    diagnostics::histogram(report, &turn.classification);
    check_results_received(report, &turn.classification);
    Ok(turn.classification)
}

/// Zero tool results across all steps means the stream bailed.
pub fn check_results_received(report: &mut Report, classification: &Classification) -> bool {
    let received = count_results(classification);
    let detail = if received > 0 {
        format!("{received} tool result(s) received")
    } else {
        "0 tool results (stream bailed)".to_string()
    };
    report
        .assert(CHECK_RESULTS_RECEIVED, received > 0, detail)
        .pass
}
