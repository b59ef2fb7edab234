//! JSON transcript files in the chat store's message format.

use dswipe_core::transcript::ChatMessage;
use dswipe_core::Result;
use std::path::{Path, PathBuf};

/// A transcript stored as a JSON array of messages.
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    path: PathBuf,
}

impl TranscriptFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<ChatMessage>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let messages: Vec<ChatMessage> = serde_json::from_str(&content)?;
        tracing::debug!(
            "[TranscriptFile] Loaded {} messages from {}",
            messages.len(),
            self.path.display()
        );
        Ok(messages)
    }

    /// Writes the messages through a sibling tmp file and renames it over
    /// the target.
    pub async fn save(&self, messages: &[ChatMessage]) -> Result<()> {
        let content = serde_json::to_string_pretty(messages)?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "transcript.json".to_string());
        let tmp_path = self.path.with_file_name(format!(".{}.tmp", file_name));

        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        tracing::debug!(
            "[TranscriptFile] Saved {} messages to {}",
            messages.len(),
            self.path.display()
        );
        Ok(())
    }
}
