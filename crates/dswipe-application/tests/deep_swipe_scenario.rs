use dswipe_application::{SwipeContext, SwipeOrchestrator, SwipeOutcome};
use dswipe_core::collaborator::{
    AddMessageOptions, ChatPersistence, ChatView, GenerationBackend, GenerationOutput,
    GenerationRequest, ModelInfoProvider, SwipeNavigation, SwipeNavigator,
};
use dswipe_core::config::SwipeSettings;
use dswipe_core::signal::StopSignal;
use dswipe_core::transcript::{ChatMessage, Transcript};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CountingView {
    renders: AtomicUsize,
}

#[async_trait::async_trait]
impl ChatView for CountingView {
    async fn print_messages(&self) -> anyhow::Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn add_one_message(&self, _: usize, _: AddMessageOptions) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_loading(&self, _: usize, _: bool) {}
}

/// Writes a half-finished impersonation into the chat, then waits until it
/// is cancelled.
#[derive(Default)]
struct StreamingBackend {
    started: Notify,
}

#[async_trait::async_trait]
impl GenerationBackend for StreamingBackend {
    async fn generate(
        &self,
        request: GenerationRequest,
        transcript: Transcript,
        token: CancellationToken,
    ) -> anyhow::Result<GenerationOutput> {
        {
            let mut messages = transcript.write().await;
            let message = &mut messages[request.message_id];
            message.text.push_str(" ...and more");
            message.alternatives.push("half".to_string());
        }
        self.started.notify_one();
        token.cancelled().await;
        anyhow::bail!("cancelled")
    }

    fn stop(&self) {}
}

struct NoNavigation;

#[async_trait::async_trait]
impl SwipeNavigator for NoNavigation {
    async fn swipe_left(&self, _: SwipeNavigation) -> anyhow::Result<()> {
        Ok(())
    }

    async fn swipe_right(&self, _: SwipeNavigation) -> anyhow::Result<()> {
        Ok(())
    }
}

struct NoPersistence;

impl ChatPersistence for NoPersistence {
    fn cancel_debounced_save(&self) {}
}

struct NoModelInfo;

impl ModelInfoProvider for NoModelInfo {
    fn generating_api(&self) -> Option<String> {
        None
    }

    fn generating_model(&self) -> Option<String> {
        None
    }
}

fn transcript_json() -> serde_json::Value {
    serde_json::json!([
        { "name": "User", "mes": "draft1", "is_user": true, "swipes": ["draft1"], "swipe_id": 0 }
    ])
}

#[tokio::test]
async fn test_stopped_user_swipe_leaves_transcript_byte_identical() {
    let messages: Vec<ChatMessage> = serde_json::from_value(transcript_json()).unwrap();
    let transcript = Transcript::new(messages);
    let view = Arc::new(CountingView::default());
    let backend = Arc::new(StreamingBackend::default());
    let signal = StopSignal::new();

    let orchestrator = SwipeOrchestrator::new(
        SwipeContext {
            transcript: transcript.clone(),
            view: view.clone(),
            backend: backend.clone(),
            navigator: Arc::new(NoNavigation),
            persistence: Arc::new(NoPersistence),
            model_info: Arc::new(NoModelInfo),
            stop_signal: signal.clone(),
        },
        SwipeSettings::default(),
    );

    let (outcome, _) = tokio::join!(orchestrator.dswipe_forward(0), async {
        backend.started.notified().await;
        signal.emit();
    });

    assert_eq!(outcome.unwrap(), SwipeOutcome::Cancelled);
    assert_eq!(view.renders.load(Ordering::SeqCst), 1);
    assert_eq!(
        serde_json::to_value(transcript.to_vec().await).unwrap(),
        transcript_json()
    );
    assert_eq!(signal.listener_count(), 0);
}
