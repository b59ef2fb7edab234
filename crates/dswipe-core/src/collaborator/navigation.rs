//! Built-in swipe navigation.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Arguments passed to the chat application's own swipe handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeNavigation {
    /// Tag identifying who requested the swipe.
    pub source: String,
    pub message_id: usize,
}

/// The chat application's native left/right swipe for assistant messages.
///
/// Deep Swipe does not reimplement assistant-side cycling; it delegates here.
#[async_trait]
pub trait SwipeNavigator: Send + Sync {
    async fn swipe_left(&self, navigation: SwipeNavigation) -> Result<()>;
    async fn swipe_right(&self, navigation: SwipeNavigation) -> Result<()>;
}
