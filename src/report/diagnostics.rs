//! Human-readable dumps of classified streams and message snapshots.

use serde_json::Value;

use crate::classify::Classification;
use crate::types::{Part, PersistedMessage, UiMessage};
use crate::util::text::{preview_value, truncate_chars};

use super::Report;

const TEXT_PREVIEW_CHARS: usize = 200;
const CONTENT_PREVIEW_CHARS: usize = 200;

/// `chunk types: {kind: n, ...}` in kind order.
pub fn histogram(report: &mut Report, classification: &Classification) {
    let entries: Vec<String> = classification
        .histogram
        .iter()
        .map(|(kind, n)| format!("{kind}: {n}"))
        .collect();
    report.line(format!("chunk types: {{{}}}", entries.join(", ")));
}

/// One block per step with its calls and results.
pub fn steps(report: &mut Report, classification: &Classification) {
    for step in &classification.steps {
        let calls: Vec<&str> = step.calls.iter().map(|c| c.tool_name.as_str()).collect();
        report.line(format!("  step {}: calls=[{}]", step.index, calls.join(", ")));
        for result in &step.results {
            report.line(format!(
                "    result {} providerExecuted={} preview={}",
                result.tool_name, result.provider_executed, result.result_preview
            ));
        }
    }
}

/// Step count, text length, and the start of the text.
pub fn text_preview(report: &mut Report, classification: &Classification) {
    report.line(format!(
        "\nCompleted in {} step(s), text length: {}",
        classification.step_count,
        classification.full_text.chars().count()
    ));
    if !classification.full_text.is_empty() {
        report.line(format!(
            "text: {}",
            truncate_chars(&classification.full_text, TEXT_PREVIEW_CHARS)
        ));
    }
}

/// Every persisted message with one line per part.
pub fn persisted_messages(report: &mut Report, messages: &[PersistedMessage]) {
    report.line(format!("Total DB messages: {}", messages.len()));
    for msg in messages {
        report.line(format!("\n  [{}] id={}", msg.role, msg.id));
        let Some(parts) = msg.parts() else {
            report.line(format!(
                "    content: {}",
                preview_value(&msg.content.raw, CONTENT_PREVIEW_CHARS)
            ));
            continue;
        };
        for (i, part) in parts.iter().enumerate() {
            report.line(format!("    part[{i}]: {}", describe_part(part)));
        }
    }
}

fn describe_part(part: &Part) -> String {
    match part {
        Part::ToolInvocation {
            invocation,
            provider_executed,
        } => format!(
            "tool-invocation toolName={} state={} providerExecuted={} hasResult={}",
            invocation.tool_name,
            invocation.state,
            provider_executed.map_or_else(|| "undefined".to_string(), |f| f.to_string()),
            invocation.result.is_some()
        ),
        Part::Text { text } => format!("text ({} chars)", text.chars().count()),
        other => other.kind().to_string(),
    }
}

/// Tool parts of the wire history, per message.
pub fn ui_history(report: &mut Report, messages: &[UiMessage]) {
    report.line(format!("  UI message history: {} messages", messages.len()));
    for msg in messages {
        let tools: Vec<_> = msg.tool_parts().collect();
        if tools.is_empty() {
            continue;
        }
        report.line(format!("    {}: {} tool part(s)", msg.role, tools.len()));
        for tool in tools {
            report.line(format!(
                "      {} state={} providerExecuted={}",
                tool.wire_type(),
                tool.state,
                tool.provider_executed
                    .map_or_else(|| "undefined".to_string(), |f| f.to_string())
            ));
        }
    }
}

/// Result payload preview for a located provider invocation.
pub fn result_preview(report: &mut Report, result: Option<&Value>) {
    let rendered = result.map_or_else(
        || "undefined".to_string(),
        |v| preview_value(v, CONTENT_PREVIEW_CHARS),
    );
    report.line(format!("      result preview: {rendered}"));
}
