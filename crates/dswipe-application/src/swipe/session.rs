//! Generation session state.

use dswipe_core::collaborator::GenerationOutput;
use dswipe_core::signal::StopSubscription;
use dswipe_core::transcript::TranscriptSnapshot;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How the awaited generation call ended.
#[derive(Debug)]
pub enum Resolution {
    /// The backend returned content and no stop was requested.
    Completed(GenerationOutput),
    /// A stop arrived before the backend finished.
    Stopped,
    /// The backend reported an error or timed out.
    Failed(String),
}

/// One in-flight generation attempt.
///
/// The session owns the rollback snapshot and the stop subscription.
/// Dropping the session releases the subscription, so a listener can never
/// outlive the attempt that registered it.
#[derive(Debug)]
pub struct GenerationSession {
    id: Uuid,
    message_id: usize,
    snapshot: Option<TranscriptSnapshot>,
    subscription: StopSubscription,
    token: CancellationToken,
    aborted: bool,
    cleanup_done: bool,
}

impl GenerationSession {
    pub fn begin(
        message_id: usize,
        token: CancellationToken,
        snapshot: TranscriptSnapshot,
        subscription: StopSubscription,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id,
            snapshot: Some(snapshot),
            subscription,
            token,
            aborted: false,
            cleanup_done: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message_id(&self) -> usize {
        self.message_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted || self.token.is_cancelled()
    }

    /// Awaits `generation`, racing it against both stop sources.
    ///
    /// Stops win ties. When a stop wins, `generation` is dropped and
    /// anything it would have resolved to is ignored.
    pub async fn run<F>(&mut self, generation: F) -> Resolution
    where
        F: Future<Output = anyhow::Result<GenerationOutput>>,
    {
        let token = self.token.clone();
        let resolution = tokio::select! {
            biased;
            _ = token.cancelled() => Resolution::Stopped,
            _ = self.subscription.fired() => Resolution::Stopped,
            result = generation => match result {
                Ok(output) => Resolution::Completed(output),
                Err(err) => Resolution::Failed(err.to_string()),
            },
        };

        if matches!(resolution, Resolution::Stopped) {
            self.aborted = true;
        }
        resolution
    }

    /// Claims the right to clean up. Only the first caller gets `true`.
    pub fn begin_cleanup(&mut self) -> bool {
        if self.cleanup_done {
            return false;
        }
        self.cleanup_done = true;
        true
    }

    /// Removes the snapshot, leaving `None` behind.
    pub fn take_snapshot(&mut self) -> Option<TranscriptSnapshot> {
        self.snapshot.take()
    }

    /// Discards the snapshot after a successful generation.
    pub fn discard_snapshot(&mut self) {
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dswipe_core::signal::StopSignal;
    use dswipe_core::transcript::{ChatMessage, Transcript};
    use std::time::Duration;

    async fn session(signal: &StopSignal) -> GenerationSession {
        let transcript = Transcript::new(vec![ChatMessage::user("draft1")]);
        GenerationSession::begin(
            0,
            CancellationToken::new(),
            transcript.snapshot().await,
            signal.subscribe(),
        )
    }

    #[tokio::test]
    async fn test_run_completes_without_stop() {
        let signal = StopSignal::new();
        let mut session = session(&signal).await;

        let resolution = session
            .run(async {
                Ok(GenerationOutput {
                    text: "draft2".to_string(),
                    reasoning: None,
                })
            })
            .await;

        assert!(matches!(resolution, Resolution::Completed(ref o) if o.text == "draft2"));
        assert!(!session.is_aborted());
    }

    #[tokio::test]
    async fn test_run_stops_on_signal() {
        let signal = StopSignal::new();
        let mut session = session(&signal).await;
        signal.emit();

        let resolution = session
            .run(std::future::pending::<anyhow::Result<GenerationOutput>>())
            .await;

        assert!(matches!(resolution, Resolution::Stopped));
        assert!(session.is_aborted());
    }

    #[tokio::test]
    async fn test_run_stops_on_token_before_ready_output() {
        let signal = StopSignal::new();
        let mut session = session(&signal).await;
        session.token().cancel();

        let resolution = session
            .run(async { Ok(GenerationOutput::default()) })
            .await;

        assert!(matches!(resolution, Resolution::Stopped));
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let signal = StopSignal::new();
        let mut session = session(&signal).await;

        let resolution = session
            .run(async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Err(anyhow::anyhow!("backend exploded"))
            })
            .await;

        assert!(matches!(resolution, Resolution::Failed(ref reason) if reason == "backend exploded"));
        assert!(!session.is_aborted());
    }

    #[tokio::test]
    async fn test_cleanup_is_claimed_once() {
        let signal = StopSignal::new();
        let mut session = session(&signal).await;

        assert!(session.begin_cleanup());
        assert!(!session.begin_cleanup());
        assert!(session.take_snapshot().is_some());
        assert!(session.take_snapshot().is_none());
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let signal = StopSignal::new();
        let session = session(&signal).await;
        assert_eq!(signal.listener_count(), 1);

        drop(session);
        assert_eq!(signal.listener_count(), 0);
    }
}
