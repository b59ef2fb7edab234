use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const EXTENSION_NAME: &str = "deep-swipe";

pub const DEFAULT_ASSISTANT_PROMPT: &str = "Write an alternative version of the assistant's last reply. Keep the same intent and stay in character.";

pub const DEFAULT_USER_PROMPT: &str = "Rewrite the user's message as the user would, keeping its intent. Reply with the message text only.";

/// What happens when a generation is requested while another is in flight.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Fail the new request with `SessionBusy`.
    #[default]
    Reject,
    /// Cancel (and roll back) the active session, then start the new one.
    CancelAndReplace,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwipeSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Source tag handed to the native swipe navigator.
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
    #[serde(default)]
    pub busy_policy: BusyPolicy,
    /// Upper bound on a single generation; `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_timeout_secs: Option<u64>,
    #[serde(default = "default_assistant_prompt")]
    pub assistant_prompt: String,
    #[serde(default = "default_user_prompt")]
    pub user_prompt: String,
}

impl SwipeSettings {
    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Guidance prompt for a generation on a user or assistant message.
    pub fn prompt_for(&self, is_user_message: bool) -> &str {
        if is_user_message {
            &self.user_prompt
        } else {
            &self.assistant_prompt
        }
    }
}

impl Default for SwipeSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            source_tag: default_source_tag(),
            busy_policy: BusyPolicy::default(),
            generation_timeout_secs: None,
            assistant_prompt: default_assistant_prompt(),
            user_prompt: default_user_prompt(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_source_tag() -> String {
    EXTENSION_NAME.to_string()
}

fn default_assistant_prompt() -> String {
    DEFAULT_ASSISTANT_PROMPT.to_string()
}

fn default_user_prompt() -> String {
    DEFAULT_USER_PROMPT.to_string()
}
