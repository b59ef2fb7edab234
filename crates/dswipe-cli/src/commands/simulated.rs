//! Offline generation backend for trying the swipe flow from a terminal.

use anyhow::Result;
use async_trait::async_trait;
use dswipe_core::collaborator::{GenerationBackend, GenerationOutput, GenerationRequest};
use dswipe_core::transcript::Transcript;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Rephrases the current text word by word, writing each chunk straight into
/// the transcript the way a streaming frontend would.
pub struct SimulatedBackend {
    chunk_delay: Duration,
    fail: bool,
    stopped: AtomicBool,
}

impl SimulatedBackend {
    pub fn new(chunk_delay: Duration, fail: bool) -> Self {
        Self {
            chunk_delay,
            fail,
            stopped: AtomicBool::new(false),
        }
    }

    fn rephrase(request: &GenerationRequest) -> Vec<String> {
        let prefix = if request.is_user_message {
            "Put differently:"
        } else {
            "Alternatively:"
        };
        std::iter::once(prefix.to_string())
            .chain(request.current_text.split_whitespace().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl GenerationBackend for SimulatedBackend {
    async fn generate(
        &self,
        request: GenerationRequest,
        transcript: Transcript,
        token: CancellationToken,
    ) -> Result<GenerationOutput> {
        self.stopped.store(false, Ordering::SeqCst);
        let mut streamed = String::new();

        for word in Self::rephrase(&request) {
            tokio::select! {
                _ = token.cancelled() => anyhow::bail!("generation cancelled"),
                _ = tokio::time::sleep(self.chunk_delay) => {}
            }
            if self.stopped.load(Ordering::SeqCst) {
                anyhow::bail!("generation stopped");
            }

            if !streamed.is_empty() {
                streamed.push(' ');
            }
            streamed.push_str(&word);

            let mut messages = transcript.write().await;
            if let Some(message) = messages.get_mut(request.message_id) {
                message.text = streamed.clone();
            }
        }

        if self.fail {
            anyhow::bail!("simulated backend failure");
        }

        Ok(GenerationOutput {
            text: streamed,
            reasoning: Some(format!("guided by: {}", request.prompt)),
        })
    }

    fn stop(&self) {
        tracing::debug!("[SimulatedBackend] stop requested");
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dswipe_core::transcript::ChatMessage;

    fn request() -> GenerationRequest {
        GenerationRequest {
            message_id: 0,
            is_user_message: true,
            current_text: "hello there".to_string(),
            prompt: "rewrite".to_string(),
        }
    }

    #[tokio::test]
    async fn test_streams_into_transcript() {
        let transcript = Transcript::new(vec![ChatMessage::user("hello there")]);
        let backend = SimulatedBackend::new(Duration::ZERO, false);

        let output = backend
            .generate(request(), transcript.clone(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.text, "Put differently: hello there");
        assert_eq!(transcript.get(0).await.unwrap().text, output.text);
        assert_eq!(output.reasoning.as_deref(), Some("guided by: rewrite"));
    }

    #[tokio::test]
    async fn test_fail_flag_errors_after_streaming() {
        let transcript = Transcript::new(vec![ChatMessage::user("hello there")]);
        let backend = SimulatedBackend::new(Duration::ZERO, true);

        let result = backend
            .generate(request(), transcript.clone(), CancellationToken::new())
            .await;

        assert!(result.is_err());
        assert_ne!(transcript.get(0).await.unwrap().text, "hello there");
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_streaming() {
        let transcript = Transcript::new(vec![ChatMessage::user("hello there")]);
        let backend = SimulatedBackend::new(Duration::from_secs(60), false);
        let token = CancellationToken::new();
        token.cancel();

        let result = backend.generate(request(), transcript.clone(), token).await;

        assert!(result.is_err());
        assert_eq!(transcript.get(0).await.unwrap().text, "hello there");
    }
}
