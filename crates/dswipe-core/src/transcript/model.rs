//! Shared transcript handle.

use super::message::ChatMessage;
use super::snapshot::TranscriptSnapshot;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The live, ordered message sequence shared with the UI layer.
///
/// Cloning a `Transcript` clones the handle, not the messages: every clone
/// observes and mutates the same sequence.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl Transcript {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(messages)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Vec<ChatMessage>> {
        self.messages.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Vec<ChatMessage>> {
        self.messages.write().await
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    /// Returns a clone of the message at `index`, if any.
    pub async fn get(&self, index: usize) -> Option<ChatMessage> {
        self.messages.read().await.get(index).cloned()
    }

    /// Returns a deep copy of every message.
    pub async fn to_vec(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Captures a deep, independent copy of the whole transcript.
    pub async fn snapshot(&self) -> TranscriptSnapshot {
        let messages = self.messages.read().await;
        TranscriptSnapshot::capture(&messages)
    }

    /// Replaces the live contents in place with a fresh copy of `snapshot`.
    ///
    /// Clears and repopulates under a single write lock so readers never
    /// observe the truncated intermediate state.
    pub async fn restore(&self, snapshot: &TranscriptSnapshot) {
        let mut messages = self.messages.write().await;
        messages.clear();
        messages.extend(snapshot.to_messages());
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::new(messages)
    }
}
