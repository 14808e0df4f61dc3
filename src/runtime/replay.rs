//! Runtime replaying recorded invocations from disk.
//!
//! Layout, one directory per invocation in call order:
//!
//! ```text
//! DIR/turn-1/events.jsonl   one stream event per line
//! DIR/turn-1/messages.json  persisted messages (optional, default [])
//! DIR/turn-1/ui.json        wire messages (optional, default: projection)
//! DIR/turn-1/error.txt      optional failure message
//! DIR/turn-2/...
//! ```
//!
//! Without `events.jsonl`, `error.txt` makes the invocation itself fail.
//! With both, the stream yields every event and then ends with the error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;

use super::{AgentInput, AgentResponse, AgentRuntime, AgentSpec, MessageSnapshot, StreamOptions};
use crate::error::{ProbeError, Result};
use crate::types::{PersistedMessage, StreamEvent, UiMessage};

const EVENTS_FILE: &str = "events.jsonl";
const MESSAGES_FILE: &str = "messages.json";
const UI_FILE: &str = "ui.json";
const ERROR_FILE: &str = "error.txt";

/// Replays `turn-N` directories, one per call to [`AgentRuntime::stream`].
#[derive(Debug)]
pub struct ReplayRuntime {
    root: PathBuf,
    next_turn: AtomicUsize,
}

impl ReplayRuntime {
    /// Open a fixture directory. The directory must exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ProbeError::fixture(&root, "fixture directory does not exist"));
        }
        Ok(Self {
            root,
            next_turn: AtomicUsize::new(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn turn_dir(&self, turn: usize) -> PathBuf {
        self.root.join(format!("turn-{turn}"))
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(raw) = read_optional(path).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ProbeError::fixture(path, e.to_string()))
}

/// Open a JSONL event log as a stream of events.
pub async fn read_event_log(path: &Path) -> Result<BoxStream<'static, Result<StreamEvent>>> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProbeError::fixture(path, "event log does not exist")
        } else {
            e.into()
        }
    })?;
    Ok(event_stream(file, path.to_path_buf(), None))
}

// Blank lines are skipped; unreadable lines still count, as `unknown` events.
fn event_stream(
    file: tokio::fs::File,
    path: PathBuf,
    failure: Option<String>,
) -> BoxStream<'static, Result<StreamEvent>> {
    let mut lines = LinesStream::new(BufReader::new(file).lines());
    let stream = async_stream::stream! {
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    yield Ok(StreamEvent::parse_line(&line));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "event log read failed");
                    yield Err(ProbeError::from(e));
                    return;
                }
            }
        }
        if let Some(message) = failure {
            yield Err(ProbeError::Stream(message));
        }
    };
    Box::pin(stream)
}

#[async_trait]
impl AgentRuntime for ReplayRuntime {
    async fn stream(
        &self,
        agent: &AgentSpec,
        input: AgentInput,
        options: StreamOptions,
    ) -> Result<AgentResponse> {
        let turn = self.next_turn.fetch_add(1, Ordering::SeqCst);
        let dir = self.turn_dir(turn);
        tracing::info!(
            turn,
            agent = %agent.id,
            messages = input.message_count(),
            max_steps = options.max_steps,
            "replaying recorded invocation"
        );
        if !dir.is_dir() {
            return Err(ProbeError::fixture(&dir, "no recorded invocation"));
        }

        let db: Vec<PersistedMessage> = read_json(&dir.join(MESSAGES_FILE))
            .await?
            .unwrap_or_default();
        let ui: Option<Vec<UiMessage>> = read_json(&dir.join(UI_FILE)).await?;
        let failure = read_optional(&dir.join(ERROR_FILE))
            .await?
            .map(|raw| raw.trim().to_string());

        let events_path = dir.join(EVENTS_FILE);
        let file = match tokio::fs::File::open(&events_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(match failure {
                    Some(message) => ProbeError::Runtime(message),
                    None => ProbeError::fixture(&events_path, "missing events.jsonl"),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let full_stream = event_stream(file, events_path, failure);

        let mut snapshot = MessageSnapshot::new(db);
        if let Some(ui) = ui {
            snapshot = snapshot.with_ui(ui);
        }

        Ok(AgentResponse {
            full_stream,
            message_list: Arc::new(snapshot),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, UNKNOWN_KIND};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn agent() -> AgentSpec {
        AgentSpec::builder()
            .id("replay")
            .name("Replay")
            .model("recorded")
            .instructions("")
            .build()
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn replays_events_and_messages() {
        let tmp = TempDir::new().unwrap();
        let turn = tmp.path().join("turn-1");
        write(
            &turn,
            EVENTS_FILE,
            concat!(
                "{\"type\":\"step-start\"}\n\n",
                "{\"type\":\"text-delta\",\"payload\":{\"text\":\"hi\"}}\n",
            ),
        );
        write(
            &turn,
            MESSAGES_FILE,
            r#"[{"id":"a1","role":"assistant","content":{"parts":[{"type":"text","text":"hi"}]}}]"#,
        );

        let runtime = ReplayRuntime::open(tmp.path()).unwrap();
        let response = runtime
            .stream(&agent(), AgentInput::Prompt("go".into()), StreamOptions::default())
            .await
            .unwrap();
        let events: Vec<_> = response.full_stream.collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].as_ref().unwrap(), &StreamEvent::text_delta("hi"));
        let db = response.message_list.db();
        assert_eq!(db.len(), 1);
        assert_eq!(db[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn error_without_events_fails_invocation() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("turn-1"), ERROR_FILE, "tool_use ids must be unique\n");

        let runtime = ReplayRuntime::open(tmp.path()).unwrap();
        let err = runtime
            .stream(&agent(), AgentInput::Prompt("go".into()), StreamOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Runtime(m) if m == "tool_use ids must be unique"));
    }

    #[tokio::test]
    async fn error_after_events_ends_stream() {
        let tmp = TempDir::new().unwrap();
        let turn = tmp.path().join("turn-1");
        write(&turn, EVENTS_FILE, "{\"type\":\"step-start\"}\n");
        write(&turn, ERROR_FILE, "connection reset");

        let runtime = ReplayRuntime::open(tmp.path()).unwrap();
        let response = runtime
            .stream(&agent(), AgentInput::Prompt("go".into()), StreamOptions::default())
            .await
            .unwrap();
        let events: Vec<_> = response.full_stream.collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], Err(ProbeError::Stream(m)) if m == "connection reset"));
    }

    #[tokio::test]
    async fn turns_advance_and_run_out() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("turn-1"), EVENTS_FILE, "");

        let runtime = ReplayRuntime::open(tmp.path()).unwrap();
        runtime
            .stream(&agent(), AgentInput::Prompt("go".into()), StreamOptions::default())
            .await
            .unwrap();
        let err = runtime
            .stream(&agent(), AgentInput::Prompt("go".into()), StreamOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Fixture { .. }));
    }

    #[tokio::test]
    async fn event_log_keeps_unreadable_lines_as_unknown() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("events.jsonl");
        std::fs::write(&path, "{\"type\":\"step-start\"}\nnot json\n").unwrap();

        let events: Vec<_> = read_event_log(&path).await.unwrap().collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].as_ref().unwrap().kind(), UNKNOWN_KIND);
    }

    #[test]
    fn missing_root_is_a_fixture_error() {
        let err = ReplayRuntime::open("/nonexistent/provexec-fixture").unwrap_err();
        assert!(err.is_fatal());
    }
}
