//! External generation backend.

use crate::transcript::Transcript;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// What the backend is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Index of the target message in the transcript.
    pub message_id: usize,
    /// Whether the target is user-authored (guided impersonation).
    pub is_user_message: bool,
    /// Content of the target at the time generation started.
    pub current_text: String,
    /// Guidance prompt for the backend.
    pub prompt: String,
}

/// What a successful generation yields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// The component that actually produces text.
///
/// A backend may stream intermediate content into `transcript` while it
/// runs; on cancellation or failure the orchestrator rolls those writes back.
/// Cancellation is cooperative: `token` is cancelled and [`stop`] is called,
/// but the backend is never forcibly terminated.
///
/// [`stop`]: GenerationBackend::stop
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
        transcript: Transcript,
        token: CancellationToken,
    ) -> Result<GenerationOutput>;

    /// Requests the backend to halt any in-flight work.
    fn stop(&self);
}
