use super::console::{ConsoleNavigator, ConsoleView, SimulatedModelInfo, WriteOnExit};
use super::simulated::SimulatedBackend;
use crate::{GenerationArgs, TargetArgs};
use anyhow::{Context, Result};
use dswipe_application::{SwipeContext, SwipeOrchestrator, SwipeOutcome};
use dswipe_core::signal::StopSignal;
use dswipe_core::transcript::Transcript;
use super::config::config_service;
use dswipe_infrastructure::TranscriptFile;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct RunOptions {
    pub config_dir: Option<PathBuf>,
}

/// An orchestrator wired to a transcript file and the terminal.
struct Session {
    file: TranscriptFile,
    orchestrator: SwipeOrchestrator,
    stop_signal: StopSignal,
}

impl Session {
    async fn open(
        options: &RunOptions,
        target: &TargetArgs,
        generation: &GenerationArgs,
    ) -> Result<Self> {
        let settings = config_service(options)?.get_settings()?;

        let file = TranscriptFile::new(&target.transcript);
        let messages = file
            .load()
            .await
            .with_context(|| format!("Failed to load {}", target.transcript.display()))?;
        let transcript = Transcript::new(messages);
        let stop_signal = StopSignal::new();

        let context = SwipeContext {
            transcript: transcript.clone(),
            view: Arc::new(ConsoleView::new(transcript.clone())),
            backend: Arc::new(SimulatedBackend::new(
                Duration::from_millis(generation.delay_ms),
                generation.fail,
            )),
            navigator: Arc::new(ConsoleNavigator::new(transcript.clone())),
            persistence: Arc::new(WriteOnExit),
            model_info: Arc::new(SimulatedModelInfo),
            stop_signal: stop_signal.clone(),
        };

        Ok(Self {
            file,
            orchestrator: SwipeOrchestrator::new(context, settings),
            stop_signal,
        })
    }

    /// Emits the stop signal after `delay`, or on Ctrl-C, whichever is first.
    fn arm_stop(&self, delay: Option<Duration>) -> tokio::task::JoinHandle<()> {
        let signal = self.stop_signal.clone();
        tokio::spawn(async move {
            let timer = async {
                match delay {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => std::future::pending::<()>().await,
                }
            };
            tokio::select! {
                _ = timer => tracing::info!("[dswipe] Stop timer elapsed"),
                _ = tokio::signal::ctrl_c() => tracing::info!("[dswipe] Interrupted"),
            }
            let listeners = signal.emit();
            tracing::debug!("[dswipe] Stop delivered to {} listener(s)", listeners);
        })
    }

    async fn finish(self) -> Result<()> {
        let messages = self.orchestrator.context().transcript.to_vec().await;
        self.file
            .save(&messages)
            .await
            .with_context(|| format!("Failed to write {}", self.file.path().display()))
    }
}

pub async fn forward(
    options: &RunOptions,
    target: &TargetArgs,
    generation: &GenerationArgs,
) -> Result<SwipeOutcome> {
    let session = Session::open(options, target, generation).await?;
    let stopper = session.arm_stop(generation.stop_after_ms.map(Duration::from_millis));

    let outcome = session.orchestrator.dswipe_forward(target.message_id).await;
    stopper.abort();

    session.finish().await?;
    Ok(outcome?)
}

pub async fn back(options: &RunOptions, target: &TargetArgs) -> Result<SwipeOutcome> {
    let session = Session::open(options, target, &GenerationArgs::default()).await?;
    let outcome = session.orchestrator.dswipe_back(target.message_id).await;
    session.finish().await?;
    Ok(outcome?)
}

pub async fn restore(
    options: &RunOptions,
    target: &TargetArgs,
    swipe_id: usize,
) -> Result<SwipeOutcome> {
    let session = Session::open(options, target, &GenerationArgs::default()).await?;
    let outcome = session
        .orchestrator
        .handle_user_swipe_back(target.message_id, swipe_id)
        .await;
    session.finish().await?;
    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dswipe_core::transcript::ChatMessage;
    use tempfile::TempDir;

    fn setup(messages: &[ChatMessage]) -> (TempDir, RunOptions, TargetArgs) {
        let dir = TempDir::new().unwrap();
        let transcript = dir.path().join("chat.json");
        std::fs::write(&transcript, serde_json::to_string(messages).unwrap()).unwrap();
        let options = RunOptions {
            config_dir: Some(dir.path().to_path_buf()),
        };
        let target = TargetArgs {
            transcript,
            message_id: 0,
        };
        (dir, options, target)
    }

    async fn reload(target: &TargetArgs) -> Vec<ChatMessage> {
        TranscriptFile::new(&target.transcript).load().await.unwrap()
    }

    #[tokio::test]
    async fn test_forward_generates_and_writes_back() {
        let (_dir, options, target) = setup(&[ChatMessage::user("hi there")]);
        let generation = GenerationArgs {
            delay_ms: 0,
            ..Default::default()
        };

        let outcome = forward(&options, &target, &generation).await.unwrap();

        assert_eq!(outcome, SwipeOutcome::Generated { swipe_id: 1 });
        let messages = reload(&target).await;
        assert_eq!(messages[0].alternatives[0], "hi there");
        assert_eq!(messages[0].text, "Put differently: hi there");
    }

    #[tokio::test]
    async fn test_forward_stopped_leaves_file_unchanged() {
        let original = vec![ChatMessage::user("one two three four")];
        let (_dir, options, target) = setup(&original);
        let generation = GenerationArgs {
            delay_ms: 200,
            stop_after_ms: Some(10),
            fail: false,
        };

        let outcome = forward(&options, &target, &generation).await.unwrap();

        assert_eq!(outcome, SwipeOutcome::Cancelled);
        assert_eq!(reload(&target).await, original);
    }

    #[tokio::test]
    async fn test_forward_failure_rolls_back() {
        let original = vec![ChatMessage::user("hello")];
        let (_dir, options, target) = setup(&original);
        let generation = GenerationArgs {
            delay_ms: 0,
            stop_after_ms: None,
            fail: true,
        };

        let outcome = forward(&options, &target, &generation).await.unwrap();

        assert!(outcome.rolled_back());
        assert_eq!(reload(&target).await, original);
    }

    #[tokio::test]
    async fn test_restore_out_of_range_is_error() {
        let (_dir, options, target) =
            setup(&[ChatMessage::user("a").with_alternatives(["a", "b"])]);

        assert!(restore(&options, &target, 5).await.is_err());
        assert!(restore(&options, &target, 1).await.is_ok());
        assert_eq!(reload(&target).await[0].text, "b");
    }

    #[tokio::test]
    async fn test_back_on_assistant_uses_native_navigation() {
        let mut message = ChatMessage::assistant("a").with_alternatives(["a", "b"]);
        message.select_alternative(1);
        let (_dir, options, target) = setup(&[message]);

        let outcome = back(&options, &target).await.unwrap();

        assert_eq!(outcome, SwipeOutcome::Delegated);
        assert_eq!(reload(&target).await[0].text, "a");
    }
}
