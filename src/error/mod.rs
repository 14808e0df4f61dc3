//! Error types for provexec.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for all harness operations.
///
/// Symptoms under test (zero tool results, re-invoked tools, missing persisted
/// results) are never errors; they are reported as failed assertions.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fixture error at {}: {message}", path.display())]
    Fixture { path: PathBuf, message: String },

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid tool name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Broad error classes, used to decide what is fatal at the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Fixture,
    Io,
    Serialization,
    Runtime,
    Tool,
}

impl ProbeError {
    /// Create a fixture error for a path.
    pub fn fixture(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Fixture {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_)
            | Self::ConfigFile(_)
            | Self::InvalidArgument(_)
            | Self::InvalidPattern(_) => ErrorCategory::Configuration,
            Self::Fixture { .. } => ErrorCategory::Fixture,
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Runtime(_) | Self::Stream(_) => ErrorCategory::Runtime,
            Self::ToolExecution { .. } => ErrorCategory::Tool,
        }
    }

    /// The underlying message, without the variant prefix `Display` adds for
    /// runtime and stream failures.
    pub fn message(&self) -> String {
        match self {
            Self::Runtime(message) | Self::Stream(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error is a harness setup failure rather than a runtime symptom.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Fixture | ErrorCategory::Io
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        let err = ProbeError::Configuration("provider_tool must not be empty".into());
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.is_fatal());
    }

    #[test]
    fn runtime_errors_are_not_fatal() {
        let err = ProbeError::Runtime("tool_use ids were found without tool_result".into());
        assert_eq!(err.category(), ErrorCategory::Runtime);
        assert!(!err.is_fatal());
    }

    #[test]
    fn message_drops_variant_prefix() {
        let err = ProbeError::Stream("overloaded".into());
        assert_eq!(err.to_string(), "Stream error: overloaded");
        assert_eq!(err.message(), "overloaded");
        let err = ProbeError::InvalidArgument("x".into());
        assert_eq!(err.message(), "Invalid argument: x");
    }

    #[test]
    fn fixture_error_mentions_path() {
        let err = ProbeError::fixture("/tmp/session/turn-2", "missing turn directory");
        assert_eq!(
            err.to_string(),
            "Fixture error at /tmp/session/turn-2: missing turn directory"
        );
    }
}
