//! Stream classification: group a runtime's event stream into steps and
//! extract tool-call and tool-result facts per step.
//!
//! Grouping follows the runtime's own step boundaries (`step-start` events), so
//! a tool called once in step 1 and again in step 2 stays distinguishable from
//! a tool called once.

pub mod predicate;

pub use predicate::ToolNamePredicate;

use std::collections::BTreeMap;

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::config::DEFAULT_PREVIEW_CHARS;
use crate::error::Result;
use crate::types::StreamEvent;
use crate::util::text::preview_value;

/// A tool call observed in a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallFact {
    pub tool_name: String,
    pub tool_call_id: Option<String>,
    pub provider_executed: bool,
}

/// A tool result observed in a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResultFact {
    pub tool_name: String,
    pub tool_call_id: Option<String>,
    pub provider_executed: bool,
    /// Result rendered as text, bounded to the classifier's preview length.
    pub result_preview: String,
}

/// One logical turn of the agent loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based; 0 holds facts seen before the first `step-start`.
    pub index: usize,
    pub calls: Vec<ToolCallFact>,
    pub results: Vec<ToolResultFact>,
}

impl Step {
    fn new(index: usize) -> Self {
        Self {
            index,
            calls: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn calls_matching<'a>(
        &'a self,
        predicate: &'a ToolNamePredicate,
    ) -> impl Iterator<Item = &'a ToolCallFact> + 'a {
        self.calls.iter().filter(move |c| predicate.matches(&c.tool_name))
    }
}

/// The step-grouped fact table for one stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Ordered by step index.
    pub steps: Vec<Step>,
    /// Concatenated text deltas.
    pub full_text: String,
    /// Number of `step-start` events seen.
    pub step_count: usize,
    /// Count of every event kind, including ones without facts.
    pub histogram: BTreeMap<String, usize>,
}

impl Classification {
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.iter().find(|s| s.index == index)
    }

    pub fn event_count(&self) -> usize {
        self.histogram.values().sum()
    }

    pub fn call_count(&self) -> usize {
        self.steps.iter().map(|s| s.calls.len()).sum()
    }
}

/// Left-to-right fold over stream events.
///
/// Accepts events one at a time so a single-pass async stream can be consumed
/// with one await per event. Never fails.
#[derive(Debug, Clone)]
pub struct StreamClassifier {
    preview_chars: usize,
    acc: Classification,
}

impl Default for StreamClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamClassifier {
    pub fn new() -> Self {
        Self::with_preview_chars(DEFAULT_PREVIEW_CHARS)
    }

    pub fn with_preview_chars(preview_chars: usize) -> Self {
        Self {
            preview_chars,
            acc: Classification::default(),
        }
    }

    /// Fold one event into the accumulated facts.
    pub fn push(&mut self, event: &StreamEvent) {
        *self.acc.histogram.entry(event.kind().to_string()).or_insert(0) += 1;
        tracing::trace!(kind = event.kind(), step = self.acc.step_count, "stream event");

        match event {
            StreamEvent::StepStart => {
                self.acc.step_count += 1;
                self.acc.steps.push(Step::new(self.acc.step_count));
            }
            StreamEvent::ToolCall(call) => {
                self.current_step().calls.push(ToolCallFact {
                    tool_name: call.tool_name.clone(),
                    tool_call_id: call.tool_call_id.clone(),
                    provider_executed: call.provider_executed,
                });
            }
            StreamEvent::ToolResult(result) => {
                let result_preview = preview_value(&result.result, self.preview_chars);
                self.current_step().results.push(ToolResultFact {
                    tool_name: result.tool_name.clone(),
                    tool_call_id: result.tool_call_id.clone(),
                    provider_executed: result.provider_executed,
                    result_preview,
                });
            }
            StreamEvent::TextDelta { text } => self.acc.full_text.push_str(text),
            StreamEvent::Other { .. } => {}
        }
    }

    /// Facts accumulated so far, without consuming the classifier.
    pub fn snapshot(&self) -> &Classification {
        &self.acc
    }

    pub fn finish(self) -> Classification {
        self.acc
    }

    // Facts before any step-start land in step 0, opened on demand.
    fn current_step(&mut self) -> &mut Step {
        let current = self.acc.step_count;
        if self.acc.steps.last().map(|s| s.index) != Some(current) {
            self.acc.steps.push(Step::new(current));
        }
        let last = self.acc.steps.len() - 1;
        &mut self.acc.steps[last]
    }
}

/// Classify an in-memory event sequence. Pure: same input, same output.
pub fn classify<'a, I>(events: I) -> Classification
where
    I: IntoIterator<Item = &'a StreamEvent>,
{
    let mut classifier = StreamClassifier::new();
    for event in events {
        classifier.push(event);
    }
    classifier.finish()
}

/// Feed a live stream into `classifier` in arrival order.
///
/// Stops at the first stream error and returns it; everything folded before
/// the error stays in the classifier.
pub async fn drain(
    mut stream: BoxStream<'_, Result<StreamEvent>>,
    classifier: &mut StreamClassifier,
) -> Result<()> {
    while let Some(item) = stream.next().await {
        classifier.push(&item?);
    }
    Ok(())
}

/// Total tool results across all steps. Zero means the stream bailed.
pub fn count_results(classification: &Classification) -> usize {
    classification.steps.iter().map(|s| s.results.len()).sum()
}

/// Steps after the first in which a matching tool was called again.
///
/// Step `s > 1` is reported when it holds a matching call and some earlier
/// step (step 0 included) also holds one. Results are not considered: an
/// earlier call is enough.
pub fn detect_reinvocation(
    classification: &Classification,
    predicate: &ToolNamePredicate,
) -> Vec<usize> {
    let mut seen = false;
    let mut reinvoked = Vec::new();
    for step in &classification.steps {
        let matched = step.calls_matching(predicate).next().is_some();
        if matched && seen && step.index > 1 {
            reinvoked.push(step.index);
        }
        seen |= matched;
    }
    reinvoked
}
