//! Transcript snapshots used for rollback.

use super::message::ChatMessage;

/// A deep copy of the transcript taken before a generation attempt.
///
/// The snapshot owns its messages outright and exposes them read-only.
/// Restoring hands out a fresh copy, so one snapshot can be restored any
/// number of times without the live transcript aliasing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSnapshot {
    messages: Vec<ChatMessage>,
    taken_at: String,
}

impl TranscriptSnapshot {
    pub fn capture(messages: &[ChatMessage]) -> Self {
        Self {
            messages: messages.to_vec(),
            taken_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// When the snapshot was captured (RFC 3339).
    pub fn taken_at(&self) -> &str {
        &self.taken_at
    }

    pub(crate) fn to_messages(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }
}
