//! Chat message types.
//!
//! Field names on the wire follow the chat store's message layout
//! (`mes`, `is_user`, `swipes`, `swipe_id`, `swipe_info`) so transcripts
//! exported by the store can be loaded without conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message written (or impersonated) on behalf of the user.
    User,
    /// Message produced by the assistant.
    Assistant,
}

impl MessageRole {
    pub fn is_user(self) -> bool {
        matches!(self, MessageRole::User)
    }
}

/// Side-channel data recorded for a single alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeInfo {
    /// Reasoning trace that accompanied the generated text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Backend identity that produced the alternative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    /// Model name that produced the alternative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Generation start (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_started: Option<String>,
    /// Generation finish (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_finished: Option<String>,
}

/// One turn in the conversation, together with its stored alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author.
    #[serde(default)]
    pub name: String,
    /// Currently active content.
    #[serde(rename = "mes")]
    pub text: String,
    /// Author role.
    #[serde(rename = "is_user", with = "role_as_is_user")]
    pub role: MessageRole,
    /// Stored text variants for this slot.
    #[serde(rename = "swipes", default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    /// Index of the alternative currently shown.
    #[serde(rename = "swipe_id", default, skip_serializing_if = "Option::is_none")]
    pub active_alternative: Option<usize>,
    /// Per-alternative metadata keyed by alternative index.
    #[serde(
        rename = "swipe_info",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub alternative_metadata: BTreeMap<usize, SwipeInfo>,
    /// Reasoning trace shown for the active content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            role,
            alternatives: Vec::new(),
            active_alternative: None,
            alternative_metadata: BTreeMap::new(),
            reasoning: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, "User", text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, "Assistant", text)
    }

    /// Builder helper that replaces the stored alternatives.
    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        if !self.alternatives.is_empty() && self.active_alternative.is_none() {
            self.active_alternative = Some(0);
        }
        self
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn alternative_count(&self) -> usize {
        self.alternatives.len()
    }

    /// Index of the active alternative, treating "unset" as 0.
    pub fn current_alternative(&self) -> usize {
        self.active_alternative.unwrap_or(0)
    }

    /// The index forward navigation would move to.
    ///
    /// Returns `None` when there is nothing to cycle to: zero or one stored
    /// alternative, or a wrap-around that lands on the current index.
    pub fn next_alternative(&self) -> Option<usize> {
        let count = self.alternative_count();
        if count <= 1 {
            return None;
        }
        let current = self.current_alternative();
        let next = (current + 1) % count;
        (next != current).then_some(next)
    }

    /// Makes `swipe_id` the active alternative and copies its text and
    /// reasoning into the live view.
    ///
    /// Returns `false` and leaves the message untouched when `swipe_id` is
    /// out of range.
    pub fn select_alternative(&mut self, swipe_id: usize) -> bool {
        let Some(text) = self.alternatives.get(swipe_id) else {
            return false;
        };
        self.text = text.clone();
        self.active_alternative = Some(swipe_id);
        self.sync_reasoning_from_swipe_info(swipe_id);
        true
    }

    /// Copies the reasoning stored for `swipe_id` into the live `reasoning`.
    ///
    /// Alternatives without metadata leave the live reasoning as-is.
    pub fn sync_reasoning_from_swipe_info(&mut self, swipe_id: usize) {
        if let Some(info) = self.alternative_metadata.get(&swipe_id) {
            self.reasoning = info.reasoning.clone();
        }
    }

    /// Appends a freshly generated alternative and makes it active.
    ///
    /// A message that never had alternatives first gets its current text
    /// stored as alternative 0, so the original content stays reachable.
    pub fn push_alternative(&mut self, text: impl Into<String>, info: SwipeInfo) -> usize {
        if self.alternatives.is_empty() {
            self.alternatives.push(self.text.clone());
        }
        self.alternatives.push(text.into());
        let swipe_id = self.alternatives.len() - 1;
        self.alternative_metadata.insert(swipe_id, info);
        self.select_alternative(swipe_id);
        swipe_id
    }
}

mod role_as_is_user {
    use super::MessageRole;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(role: &MessageRole, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(role.is_user())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<MessageRole, D::Error>
    where
        D: Deserializer<'de>,
    {
        let is_user = bool::deserialize(deserializer)?;
        Ok(if is_user {
            MessageRole::User
        } else {
            MessageRole::Assistant
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_alternative_cycles_and_wraps() {
        let mut message = ChatMessage::user("a0").with_alternatives(["a0", "a1", "a2"]);
        assert_eq!(message.next_alternative(), Some(1));

        message.active_alternative = Some(2);
        assert_eq!(message.next_alternative(), Some(0));
    }

    #[test]
    fn test_next_alternative_none_for_single_swipe() {
        let message = ChatMessage::user("only").with_alternatives(["only"]);
        assert_eq!(message.next_alternative(), None);
        assert_eq!(ChatMessage::user("bare").next_alternative(), None);
    }

    #[test]
    fn test_select_alternative_syncs_reasoning() {
        let mut message = ChatMessage::user("a0").with_alternatives(["a0", "a1"]);
        message.alternative_metadata.insert(
            1,
            SwipeInfo {
                reasoning: Some("because".to_string()),
                ..Default::default()
            },
        );

        assert!(message.select_alternative(1));
        assert_eq!(message.text, "a1");
        assert_eq!(message.active_alternative, Some(1));
        assert_eq!(message.reasoning.as_deref(), Some("because"));
    }

    #[test]
    fn test_select_alternative_out_of_range_is_noop() {
        let mut message = ChatMessage::user("a0").with_alternatives(["a0"]);
        let before = message.clone();
        assert!(!message.select_alternative(3));
        assert_eq!(message, before);
    }

    #[test]
    fn test_push_alternative_seeds_original_text() {
        let mut message = ChatMessage::user("draft1");
        let swipe_id = message.push_alternative("draft2", SwipeInfo::default());

        assert_eq!(swipe_id, 1);
        assert_eq!(message.alternatives, vec!["draft1", "draft2"]);
        assert_eq!(message.text, "draft2");
        assert_eq!(message.active_alternative, Some(1));
    }

    #[test]
    fn test_serde_uses_chat_store_field_names() {
        let message = ChatMessage::user("hi").with_alternatives(["hi"]);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["mes"], "hi");
        assert_eq!(json["is_user"], true);
        assert_eq!(json["swipes"][0], "hi");
        assert_eq!(json["swipe_id"], 0);

        let back: ChatMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
