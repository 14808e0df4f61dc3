//! Resume scenario.
//!
//! Turn one runs the parallel tool call and inspects what was persisted for
//! the provider-executed tool. The persisted history, in wire form plus a
//! follow-up question, is then replayed through a fresh agent. A failure of
//! that second invocation is recorded as a check instead of aborting the run.

use crate::classify::{drain, StreamClassifier};
use crate::correlate::{correlate_persisted, provider_invocations};
use crate::error::Result;
use crate::report::{diagnostics, Report};
use crate::runtime::{AgentInput, AgentRuntime, AgentSpec, StreamOptions};
use crate::types::UiMessage;
use crate::util::text::truncate_chars;

use super::{agents, run_turn, ScenarioSettings, FOLLOW_UP_ID, FOLLOW_UP_TEXT, PROMPT};

pub const CHECK_STREAM_COMPLETES: &str = "stream-completes";
pub const CHECK_TOOL_FOUND: &str = "provider-executed-tool-found";
pub const CHECK_TOOL_HAS_RESULT: &str = "provider-executed-tool-has-result";
pub const CHECK_RESUME_NO_ERROR: &str = "resume-no-error";
pub const CHECK_RESUME_HAS_TEXT: &str = "resume-has-text";

pub async fn run(
    runtime: &dyn AgentRuntime,
    settings: &ScenarioSettings,
    report: &mut Report,
) -> Result<()> {
    report.section("Step 1: Run agent (triggers web_search + get_company_info in parallel)");

    let agent = agents::resume_test(&settings.model);
    let turn = run_turn(
        runtime,
        &agent,
        AgentInput::Prompt(PROMPT.to_string()),
        settings.max_steps,
        settings.preview_chars,
    )
    .await?;
    let first = &turn.classification;
    let text_len = first.full_text.chars().count();

    diagnostics::text_preview(report, first);
    report.assert(
        CHECK_STREAM_COMPLETES,
        first.step_count >= 1 && text_len > 0,
        format!("{} steps, {text_len} chars", first.step_count),
    );

    report.section("Step 2: Inspect DB messages for tool invocation state");

    let db = turn.messages.db();
    diagnostics::persisted_messages(report, &db);
    for (invocation, flag) in provider_invocations(&db, &settings.predicate) {
        report.line(format!("\n  >>> Found provider tool {}:", invocation.tool_name));
        report.line(format!(
            "      providerExecuted flag: {}",
            flag.map_or_else(|| "undefined".to_string(), |f| f.to_string())
        ));
        report.line(format!("      state: {}", invocation.state));
        report.line(format!("      hasResult: {}", invocation.result.is_some()));
        diagnostics::result_preview(report, invocation.result.as_ref());
    }

    let persisted = correlate_persisted(&db, &settings.predicate);
    report.assert(
        CHECK_TOOL_FOUND,
        persisted.found,
        if persisted.found {
            format!("Found provider-executed tool ({})", persisted.tool_call_id)
        } else {
            format!(
                "No provider-executed tool or tool {} found in messageList",
                settings.predicate
            )
        },
    );
    report.assert(
        CHECK_TOOL_HAS_RESULT,
        persisted.has_result,
        format!(
            "State: \"{}\", hasResult: {}",
            persisted.state, persisted.has_result
        ),
    );

    report.section("Step 3: Simulate resume (send follow-up message)");

    let mut history = turn.messages.ui();
    diagnostics::ui_history(report, &history);
    history.push(UiMessage::user_text(FOLLOW_UP_ID, FOLLOW_UP_TEXT));

    let follow_up = agents::resume_follow_up(&settings.model);
    let options = StreamOptions::builder()
        .max_steps(settings.resume_max_steps)
        .build();
    let mut classifier = StreamClassifier::with_preview_chars(settings.preview_chars);
    let outcome = resume(runtime, &follow_up, history, options, &mut classifier).await;
    let resumed = classifier.finish();
    let resume_len = resumed.full_text.chars().count();

    match outcome {
        Ok(()) => {
            report.assert(
                CHECK_RESUME_NO_ERROR,
                true,
                format!("Resume succeeded, {resume_len} chars"),
            );
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, category = ?e.category(), "resume invocation failed");
            report.assert(
                CHECK_RESUME_NO_ERROR,
                false,
                format!(
                    "Resume failed: {}",
                    truncate_chars(&e.message(), settings.error_chars)
                ),
            );
        }
    }
    report.assert(
        CHECK_RESUME_HAS_TEXT,
        resume_len > 0,
        format!("Resume text length: {resume_len}"),
    );
    Ok(())
}

// Call-time and mid-stream errors both surface here; text folded before a
// mid-stream error stays in `classifier`.
async fn resume(
    runtime: &dyn AgentRuntime,
    agent: &AgentSpec,
    history: Vec<UiMessage>,
    options: StreamOptions,
    classifier: &mut StreamClassifier,
) -> Result<()> {
    let response = runtime
        .stream(agent, AgentInput::Messages(history), options)
        .await?;
    drain(response.full_stream, classifier).await
}
