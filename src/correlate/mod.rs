//! Correlate provider-executed tool calls with what the runtime persisted.

use crate::classify::ToolNamePredicate;
use crate::types::{Part, PersistedMessage, Role, ToolInvocation};

/// State reported when no provider-executed invocation was persisted.
pub const NOT_FOUND: &str = "not found";

/// Outcome of scanning persisted messages for a provider-executed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCorrelation {
    pub found: bool,
    pub state: String,
    pub has_result: bool,
    pub tool_call_id: String,
}

impl Default for PersistedCorrelation {
    fn default() -> Self {
        Self {
            found: false,
            state: NOT_FOUND.to_string(),
            has_result: false,
            tool_call_id: String::new(),
        }
    }
}

impl PersistedCorrelation {
    fn from_invocation(invocation: &ToolInvocation) -> Self {
        Self {
            found: true,
            state: invocation.state.to_string(),
            has_result: invocation.has_result(),
            tool_call_id: invocation.tool_call_id.clone(),
        }
    }
}

/// Provider-executed tool invocations in assistant messages, in order.
///
/// A part qualifies when it carries `providerExecuted: true` or, failing
/// that, when its tool name matches `predicate`.
pub fn provider_invocations<'a>(
    messages: &'a [PersistedMessage],
    predicate: &'a ToolNamePredicate,
) -> impl Iterator<Item = (&'a ToolInvocation, Option<bool>)> + 'a {
    messages
        .iter()
        .filter(|msg| msg.role == Role::Assistant)
        .filter_map(|msg| msg.parts())
        .flatten()
        .filter_map(move |part| match part {
            Part::ToolInvocation {
                invocation,
                provider_executed,
            } if *provider_executed == Some(true) || predicate.matches(&invocation.tool_name) => {
                Some((invocation, *provider_executed))
            }
            _ => None,
        })
}

/// Report the first provider-executed invocation and whether it reached a
/// terminal `result` state with a non-null result.
pub fn correlate_persisted(
    messages: &[PersistedMessage],
    predicate: &ToolNamePredicate,
) -> PersistedCorrelation {
    match provider_invocations(messages, predicate).next() {
        Some((invocation, flag)) => {
            tracing::debug!(
                tool = %invocation.tool_name,
                state = %invocation.state,
                provider_executed = ?flag,
                "persisted provider-executed invocation"
            );
            PersistedCorrelation::from_invocation(invocation)
        }
        None => PersistedCorrelation::default(),
    }
}
