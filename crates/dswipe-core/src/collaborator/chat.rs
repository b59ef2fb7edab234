//! Chat store hooks consumed by the orchestrator.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How a message should be (re-)added to the rendered chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddMessageKind {
    /// A regular new message.
    Normal,
    /// A swipe of an existing slot.
    Swipe,
}

/// Options for [`ChatView::add_one_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMessageOptions {
    pub kind: AddMessageKind,
    /// Replace the rendered message at this index instead of appending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_id: Option<usize>,
}

impl AddMessageOptions {
    /// Re-render the slot at `message_id` in place.
    pub fn replace_swipe(message_id: usize) -> Self {
        Self {
            kind: AddMessageKind::Swipe,
            force_id: Some(message_id),
        }
    }

    /// Append the message as a fresh swipe entry.
    pub fn append_swipe() -> Self {
        Self {
            kind: AddMessageKind::Swipe,
            force_id: None,
        }
    }
}

/// Rendering side of the chat application.
///
/// Implementations read message content from the shared transcript; the
/// orchestrator only tells them what changed.
#[async_trait]
pub trait ChatView: Send + Sync {
    /// Re-renders the entire chat from the transcript.
    async fn print_messages(&self) -> Result<()>;

    /// Renders the message at `message_id` according to `options`.
    async fn add_one_message(&self, message_id: usize, options: AddMessageOptions) -> Result<()>;

    /// Advisory "generation in progress" hint for one message.
    fn set_loading(&self, message_id: usize, loading: bool);
}

/// Persistence side of the chat store.
pub trait ChatPersistence: Send + Sync {
    /// Drops any pending debounced save so a partial transcript is never
    /// flushed while a generation is in flight.
    fn cancel_debounced_save(&self);
}
