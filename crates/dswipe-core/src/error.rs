//! Error types for Deep Swipe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Deep Swipe workspace.
///
/// Navigation-path errors (`InvalidMessageId`, `InvalidSwipeIndex`,
/// `SessionBusy`) are surfaced to the caller. `GenerationFailure` and
/// `MissingSnapshot` are recovered inside the orchestrator and only logged.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DswipeError {
    /// The referenced message does not exist in the transcript.
    #[error("Invalid message ID: {id} (transcript has {len} messages)")]
    InvalidMessageId { id: usize, len: usize },

    /// The requested alternative does not exist on the message.
    #[error("Invalid swipe index {swipe_id} for message {message_id} ({count} alternatives)")]
    InvalidSwipeIndex {
        message_id: usize,
        swipe_id: usize,
        count: usize,
    },

    /// The external generation call failed or timed out.
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// Rollback was attempted without a snapshot.
    #[error("No snapshot available for rollback")]
    MissingSnapshot,

    /// Another generation session is already in flight.
    #[error("A generation session is already active for message {message_id}")]
    SessionBusy { message_id: usize },

    /// The extension is turned off in settings.
    #[error("Deep Swipe is disabled")]
    Disabled,

    /// A navigation or view collaborator failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DswipeError {
    pub fn invalid_message_id(id: usize, len: usize) -> Self {
        Self::InvalidMessageId { id, len }
    }

    pub fn generation_failure(message: impl Into<String>) -> Self {
        Self::GenerationFailure(message.into())
    }

    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error rejects the message reference itself.
    pub fn is_invalid_message_id(&self) -> bool {
        matches!(self, Self::InvalidMessageId { .. })
    }

    /// Check if this error was caused by a concurrent generation session.
    pub fn is_session_busy(&self) -> bool {
        matches!(self, Self::SessionBusy { .. })
    }
}

impl From<std::io::Error> for DswipeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DswipeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DswipeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DswipeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error, used at collaborator boundaries.
impl From<anyhow::Error> for DswipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, DswipeError>`.
pub type Result<T> = std::result::Result<T, DswipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_id_display() {
        let err = DswipeError::invalid_message_id(7, 3);
        assert!(err.is_invalid_message_id());
        assert_eq!(
            err.to_string(),
            "Invalid message ID: 7 (transcript has 3 messages)"
        );
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DswipeError = io.into();
        match err {
            DswipeError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
