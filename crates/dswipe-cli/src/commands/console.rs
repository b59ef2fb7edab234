//! Terminal stand-ins for the chat frontend.

use anyhow::Result;
use async_trait::async_trait;
use dswipe_core::collaborator::{
    AddMessageKind, AddMessageOptions, ChatPersistence, ChatView, ModelInfoProvider,
    SwipeNavigation, SwipeNavigator,
};
use dswipe_core::transcript::{ChatMessage, Transcript};

fn render(index: usize, message: &ChatMessage) -> String {
    let swipes = match message.alternative_count() {
        0 => String::new(),
        count => format!(" [{}/{}]", message.current_alternative() + 1, count),
    };
    format!("#{} {}{}: {}", index, message.name, swipes, message.text)
}

/// Prints the transcript to stdout.
pub struct ConsoleView {
    transcript: Transcript,
}

impl ConsoleView {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }
}

#[async_trait]
impl ChatView for ConsoleView {
    async fn print_messages(&self) -> Result<()> {
        let messages = self.transcript.read().await;
        for (index, message) in messages.iter().enumerate() {
            println!("{}", render(index, message));
        }
        Ok(())
    }

    async fn add_one_message(&self, message_id: usize, options: AddMessageOptions) -> Result<()> {
        let messages = self.transcript.read().await;
        let message = messages
            .get(message_id)
            .ok_or_else(|| anyhow::anyhow!("no message at index {}", message_id))?;
        let marker = match (options.kind, options.force_id) {
            (AddMessageKind::Swipe, Some(_)) => "~",
            (AddMessageKind::Swipe, None) => "+",
            (AddMessageKind::Normal, _) => " ",
        };
        println!("{}{}", marker, render(message_id, message));
        Ok(())
    }

    fn set_loading(&self, message_id: usize, loading: bool) {
        tracing::debug!("[ConsoleView] message {} loading: {}", message_id, loading);
    }
}

/// Native swipe navigation over the stored alternatives.
///
/// Right wraps around to the first alternative; left stops at the first.
pub struct ConsoleNavigator {
    transcript: Transcript,
}

impl ConsoleNavigator {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript }
    }

    async fn step(&self, navigation: SwipeNavigation, forward: bool) -> Result<()> {
        let mut messages = self.transcript.write().await;
        let message = messages
            .get_mut(navigation.message_id)
            .ok_or_else(|| anyhow::anyhow!("no message at index {}", navigation.message_id))?;

        let count = message.alternative_count();
        if count == 0 {
            return Ok(());
        }
        let current = message.current_alternative();
        let target = if forward {
            (current + 1) % count
        } else {
            current.saturating_sub(1)
        };
        message.select_alternative(target);
        tracing::debug!(
            "[ConsoleNavigator] {} moved message {} to swipe {}",
            navigation.source,
            navigation.message_id,
            target
        );
        println!("~{}", render(navigation.message_id, message));
        Ok(())
    }
}

#[async_trait]
impl SwipeNavigator for ConsoleNavigator {
    async fn swipe_left(&self, navigation: SwipeNavigation) -> Result<()> {
        self.step(navigation, false).await
    }

    async fn swipe_right(&self, navigation: SwipeNavigation) -> Result<()> {
        self.step(navigation, true).await
    }
}

/// The transcript is only written once, on exit.
pub struct WriteOnExit;

impl ChatPersistence for WriteOnExit {
    fn cancel_debounced_save(&self) {
        tracing::trace!("[WriteOnExit] nothing pending");
    }
}

pub struct SimulatedModelInfo;

impl ModelInfoProvider for SimulatedModelInfo {
    fn generating_api(&self) -> Option<String> {
        Some("simulated".to_string())
    }

    fn generating_model(&self) -> Option<String> {
        Some("echo".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigator_wraps_right_and_clamps_left() {
        let transcript = Transcript::new(vec![
            ChatMessage::assistant("a").with_alternatives(["a", "b"]),
        ]);
        let navigator = ConsoleNavigator::new(transcript.clone());
        let navigation = || SwipeNavigation {
            source: "deep-swipe".to_string(),
            message_id: 0,
        };

        navigator.swipe_left(navigation()).await.unwrap();
        assert_eq!(transcript.get(0).await.unwrap().text, "a");

        navigator.swipe_right(navigation()).await.unwrap();
        assert_eq!(transcript.get(0).await.unwrap().text, "b");

        navigator.swipe_right(navigation()).await.unwrap();
        assert_eq!(transcript.get(0).await.unwrap().current_alternative(), 0);
    }

    #[test]
    fn test_render_shows_swipe_position() {
        let message = ChatMessage::user("hi").with_alternatives(["hi", "hello"]);
        assert_eq!(render(2, &message), "#2 User [1/2]: hi");
    }
}
