use super::SwipeOutcome;
use super::session::{GenerationSession, Resolution};
use crate::context::SwipeContext;
use dswipe_core::collaborator::{
    AddMessageOptions, GenerationOutput, GenerationRequest, SwipeNavigation,
};
use dswipe_core::config::{BusyPolicy, SwipeSettings};
use dswipe_core::error::{DswipeError, Result};
use dswipe_core::transcript::{ChatMessage, SwipeInfo};
use std::sync::{Mutex as StdMutex, MutexGuard as StdMutexGuard};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// The session currently occupying the orchestrator's single slot.
#[derive(Debug, Clone)]
struct ActiveSession {
    message_id: usize,
    token: CancellationToken,
}

/// Holds the generation slot for the lifetime of one `generate` call.
///
/// The active-session record is written as soon as the slot is taken, so a
/// stop can reach the attempt before generation has even started. It is
/// cleared before the slot is released, on every exit path.
struct SlotGuard<'a> {
    message_id: usize,
    active: &'a StdMutex<Option<ActiveSession>>,
    token: CancellationToken,
    _slot: MutexGuard<'a, ()>,
}

impl SlotGuard<'_> {
    fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        lock_active(self.active).take();
    }
}

/// A `CancelAndReplace` request queued behind the active session.
#[derive(Debug, Clone)]
struct PendingReplacement {
    ticket: Uuid,
    token: CancellationToken,
}

/// Clears the pending record on every exit path, unless a newer request
/// already took its place.
struct PendingGuard<'a> {
    pending: &'a StdMutex<Option<PendingReplacement>>,
    ticket: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = lock_record(self.pending);
        if pending.as_ref().is_some_and(|p| p.ticket == self.ticket) {
            pending.take();
        }
    }
}

fn lock_record<T>(record: &StdMutex<Option<T>>) -> StdMutexGuard<'_, Option<T>> {
    // The record is a plain value; a panic elsewhere cannot leave it torn.
    record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_active(
    active: &StdMutex<Option<ActiveSession>>,
) -> StdMutexGuard<'_, Option<ActiveSession>> {
    lock_record(active)
}

/// Drives swipe navigation and generation for one chat.
///
/// `SwipeOrchestrator` is responsible for:
/// - Choosing between cheap navigation and generation per message role
/// - Snapshotting the transcript before generation
/// - Racing generation against stop requests
/// - Restoring the snapshot when generation is stopped or fails
///
/// At most one generation is in flight per orchestrator. What happens to a
/// second request is decided by [`BusyPolicy`]. Under `CancelAndReplace`
/// only the newest queued request survives; older waiters give up without
/// generating.
pub struct SwipeOrchestrator {
    context: SwipeContext,
    settings: SwipeSettings,
    slot: Mutex<()>,
    active: StdMutex<Option<ActiveSession>>,
    pending: StdMutex<Option<PendingReplacement>>,
}

impl SwipeOrchestrator {
    pub fn new(context: SwipeContext, settings: SwipeSettings) -> Self {
        Self {
            context,
            settings,
            slot: Mutex::new(()),
            active: StdMutex::new(None),
            pending: StdMutex::new(None),
        }
    }

    pub fn context(&self) -> &SwipeContext {
        &self.context
    }

    pub fn settings(&self) -> &SwipeSettings {
        &self.settings
    }

    /// Whether a generation session is currently active.
    pub fn is_generating(&self) -> bool {
        lock_active(&self.active).is_some()
    }

    /// Index of the message the active session is generating for.
    pub fn active_message_id(&self) -> Option<usize> {
        lock_active(&self.active).as_ref().map(|s| s.message_id)
    }

    /// Requests cancellation of the active session and of any replacement
    /// queued behind it.
    ///
    /// Returns `false` when nothing was generating or queued. The rollback
    /// itself runs inside the pending `generate_message_swipe` call.
    pub fn stop(&self) -> bool {
        let queued = match lock_record(&self.pending).take() {
            Some(replacement) => {
                replacement.token.cancel();
                true
            }
            None => false,
        };
        self.stop_active() || queued
    }

    fn stop_active(&self) -> bool {
        match lock_active(&self.active).as_ref() {
            Some(session) => {
                tracing::info!(
                    "[DeepSwipe] Stop requested - message_id: {}",
                    session.message_id
                );
                session.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Navigates forward on a message.
    ///
    /// Assistant messages are handed to the native `swipe_right`. User
    /// messages cycle through stored alternatives, or generate a new one
    /// when there is nothing to cycle to.
    pub async fn dswipe_forward(&self, message_id: usize) -> Result<SwipeOutcome> {
        self.ensure_enabled()?;
        let message = self.message_at(message_id).await?;

        if !message.is_user() {
            self.context
                .navigator
                .swipe_right(self.navigation(message_id))
                .await
                .map_err(|e| DswipeError::navigation(e.to_string()))?;
            return Ok(SwipeOutcome::Delegated);
        }

        let navigated = {
            let mut messages = self.context.transcript.write().await;
            let len = messages.len();
            let message = messages
                .get_mut(message_id)
                .ok_or_else(|| DswipeError::invalid_message_id(message_id, len))?;
            match message.next_alternative() {
                Some(next) => message.select_alternative(next).then_some(next),
                None => None,
            }
        };

        match navigated {
            Some(swipe_id) => {
                tracing::debug!(
                    "[DeepSwipe] Navigated message {} to swipe {}",
                    message_id,
                    swipe_id
                );
                self.context
                    .view
                    .add_one_message(message_id, AddMessageOptions::replace_swipe(message_id))
                    .await
                    .map_err(|e| DswipeError::navigation(e.to_string()))?;
                Ok(SwipeOutcome::Navigated { swipe_id })
            }
            None => self.generate_message_swipe(message_id, true).await,
        }
    }

    /// Navigates back on a message.
    ///
    /// Assistant messages are handed to the native `swipe_left`, which owns
    /// its own deletion semantics. User messages are re-added as a fresh
    /// swipe entry rather than mutated in place.
    pub async fn dswipe_back(&self, message_id: usize) -> Result<SwipeOutcome> {
        self.ensure_enabled()?;
        let message = self.message_at(message_id).await?;

        if message.is_user() {
            self.context
                .view
                .add_one_message(message_id, AddMessageOptions::append_swipe())
                .await
                .map_err(|e| DswipeError::navigation(e.to_string()))?;
            Ok(SwipeOutcome::Appended)
        } else {
            self.context
                .navigator
                .swipe_left(self.navigation(message_id))
                .await
                .map_err(|e| DswipeError::navigation(e.to_string()))?;
            Ok(SwipeOutcome::Delegated)
        }
    }

    /// Makes a stored alternative of a user message active again.
    pub async fn handle_user_swipe_back(
        &self,
        message_id: usize,
        target_swipe_id: usize,
    ) -> Result<SwipeOutcome> {
        self.ensure_enabled()?;
        {
            let mut messages = self.context.transcript.write().await;
            let len = messages.len();
            let message = messages
                .get_mut(message_id)
                .ok_or_else(|| DswipeError::invalid_message_id(message_id, len))?;
            let count = message.alternative_count();
            if !message.select_alternative(target_swipe_id) {
                return Err(DswipeError::InvalidSwipeIndex {
                    message_id,
                    swipe_id: target_swipe_id,
                    count,
                });
            }
        }

        self.context
            .view
            .print_messages()
            .await
            .map_err(|e| DswipeError::navigation(e.to_string()))?;
        Ok(SwipeOutcome::Navigated {
            swipe_id: target_swipe_id,
        })
    }

    /// Generates a new alternative for a message.
    ///
    /// The transcript is snapshotted first. If the generation is stopped or
    /// fails, the transcript is restored to exactly that snapshot and the
    /// outcome reports it; only precondition failures are returned as `Err`.
    pub async fn generate_message_swipe(
        &self,
        message_id: usize,
        is_user_message: bool,
    ) -> Result<SwipeOutcome> {
        self.ensure_enabled()?;
        self.message_at(message_id).await?;

        let Some(slot) = self.acquire_slot(message_id).await? else {
            return Ok(SwipeOutcome::Cancelled);
        };
        // The transcript may have been rolled back while waiting for the slot.
        let message = self.message_at(message_id).await?;

        let span = tracing::info_span!("swipe_session", message_id, is_user_message);
        Ok(self
            .run_session(slot, message, is_user_message)
            .instrument(span)
            .await)
    }

    async fn run_session(
        &self,
        slot: SlotGuard<'_>,
        message: ChatMessage,
        is_user_message: bool,
    ) -> SwipeOutcome {
        let message_id = slot.message_id;
        tracing::info!(
            "[DeepSwipe] Starting generation - message_id: {}, is_user_message: {}",
            message_id,
            is_user_message
        );

        let snapshot = self.context.transcript.snapshot().await;
        tracing::debug!(
            "[DeepSwipe] Complete chat backup saved, length: {}",
            snapshot.len()
        );
        let mut session = GenerationSession::begin(
            message_id,
            slot.token(),
            snapshot,
            self.context.stop_signal.subscribe(),
        );

        self.context.view.set_loading(message_id, true);
        self.context.persistence.cancel_debounced_save();

        let request = GenerationRequest {
            message_id,
            is_user_message,
            current_text: message.text.clone(),
            prompt: self.settings.prompt_for(is_user_message).to_string(),
        };
        let gen_started = chrono::Utc::now().to_rfc3339();
        let generation = self.context.backend.generate(
            request,
            self.context.transcript.clone(),
            session.token().child_token(),
        );
        let timeout = self.settings.generation_timeout();
        let resolution = session
            .run(async move {
                match timeout {
                    Some(limit) => match tokio::time::timeout(limit, generation).await {
                        Ok(result) => result,
                        Err(_) => Err(anyhow::anyhow!(
                            "generation timed out after {}s",
                            limit.as_secs()
                        )),
                    },
                    None => generation.await,
                }
            })
            .await;

        let outcome = match resolution {
            Resolution::Completed(output) if !session.is_aborted() => {
                match self
                    .commit(&mut session, &message.text, output, gen_started)
                    .await
                {
                    Ok(swipe_id) => SwipeOutcome::Generated { swipe_id },
                    Err(err) => self.fail(&mut session, err).await,
                }
            }
            Resolution::Completed(_) | Resolution::Stopped => {
                tracing::warn!("[DeepSwipe] Generation was aborted");
                self.rollback(&mut session).await;
                SwipeOutcome::Cancelled
            }
            Resolution::Failed(reason) => {
                self.fail(&mut session, DswipeError::generation_failure(reason))
                    .await
            }
        };

        self.context.view.set_loading(message_id, false);
        drop(session);
        drop(slot);
        outcome
    }

    /// Takes the generation slot.
    ///
    /// Returns `None` when a queued `CancelAndReplace` request was superseded
    /// (or stopped) before the slot became free.
    async fn acquire_slot(&self, message_id: usize) -> Result<Option<SlotGuard<'_>>> {
        let token = CancellationToken::new();
        let mut queued = None;
        let slot = match self.slot.try_lock() {
            Ok(slot) => slot,
            Err(_) => match self.settings.busy_policy {
                BusyPolicy::Reject => {
                    let active_id = self.active_message_id().unwrap_or(message_id);
                    tracing::warn!(
                        "[DeepSwipe] Rejecting generation, session active for message {}",
                        active_id
                    );
                    return Err(DswipeError::SessionBusy {
                        message_id: active_id,
                    });
                }
                BusyPolicy::CancelAndReplace => {
                    tracing::info!(
                        "[DeepSwipe] Replacing active session with message {}",
                        message_id
                    );
                    let ticket = Uuid::new_v4();
                    {
                        // Lock order: pending, then active.
                        let mut pending = lock_record(&self.pending);
                        let older = pending.replace(PendingReplacement {
                            ticket,
                            token: token.clone(),
                        });
                        if let Some(older) = older {
                            older.token.cancel();
                        }
                        self.stop_active();
                    }
                    queued = Some(PendingGuard {
                        pending: &self.pending,
                        ticket,
                    });
                    self.slot.lock().await
                }
            },
        };

        {
            let pending = lock_record(&self.pending);
            let ours = queued.as_ref().map(|guard| guard.ticket);
            let newer_waiting = pending.as_ref().is_some_and(|p| Some(p.ticket) != ours);
            if token.is_cancelled() || newer_waiting {
                tracing::info!(
                    "[DeepSwipe] Generation for message {} was superseded before it started",
                    message_id
                );
                return Ok(None);
            }
            *lock_active(&self.active) = Some(ActiveSession {
                message_id,
                token: token.clone(),
            });
        }

        Ok(Some(SlotGuard {
            message_id,
            active: &self.active,
            token,
            _slot: slot,
        }))
    }

    /// Stores the generated text as the message's new active alternative.
    async fn commit(
        &self,
        session: &mut GenerationSession,
        original_text: &str,
        output: GenerationOutput,
        gen_started: String,
    ) -> Result<usize> {
        let message_id = session.message_id();
        let model_info = self.context.model_info.current();
        let info = SwipeInfo {
            reasoning: output.reasoning,
            api: model_info.api,
            model: Some(model_info.model),
            gen_started: Some(gen_started),
            gen_finished: Some(chrono::Utc::now().to_rfc3339()),
        };

        let swipe_id = {
            let mut messages = self.context.transcript.write().await;
            let len = messages.len();
            let message = messages
                .get_mut(message_id)
                .ok_or_else(|| DswipeError::invalid_message_id(message_id, len))?;
            // Streamed partial text must not become alternative 0.
            if message.alternatives.is_empty() {
                message.alternatives.push(original_text.to_string());
            }
            message.push_alternative(output.text, info)
        };

        session.discard_snapshot();
        tracing::info!(
            "[DeepSwipe] Generation complete - message_id: {}, swipe_id: {}",
            message_id,
            swipe_id
        );

        if let Err(e) = self
            .context
            .view
            .add_one_message(message_id, AddMessageOptions::replace_swipe(message_id))
            .await
        {
            tracing::warn!("[DeepSwipe] Failed to render generated swipe: {}", e);
        }
        Ok(swipe_id)
    }

    async fn fail(&self, session: &mut GenerationSession, err: DswipeError) -> SwipeOutcome {
        tracing::error!("[DeepSwipe] Generation error: {}", err);
        self.rollback(session).await;
        SwipeOutcome::Failed {
            reason: err.to_string(),
        }
    }

    /// Restores the transcript from the session snapshot. Runs at most once
    /// per session.
    async fn rollback(&self, session: &mut GenerationSession) {
        if !session.begin_cleanup() {
            tracing::debug!(
                "[DeepSwipe] Rollback already performed for session {}",
                session.id()
            );
            return;
        }

        tracing::info!("[DeepSwipe] STOP - Restoring complete chat from backup");
        session.token().cancel();
        self.context.backend.stop();

        match session.take_snapshot() {
            Some(snapshot) => {
                self.context.transcript.restore(&snapshot).await;
                tracing::info!(
                    "[DeepSwipe] Chat restored from backup taken at {}, length: {}",
                    snapshot.taken_at(),
                    snapshot.len()
                );
            }
            None => tracing::error!("[DeepSwipe] {}", DswipeError::MissingSnapshot),
        }

        if let Err(e) = self.context.view.print_messages().await {
            tracing::warn!("[DeepSwipe] Failed to re-render after rollback: {}", e);
        }
        tracing::info!("[DeepSwipe] Stop cleanup complete");
    }

    async fn message_at(&self, message_id: usize) -> Result<ChatMessage> {
        let messages = self.context.transcript.read().await;
        messages.get(message_id).cloned().ok_or_else(|| {
            tracing::error!("[DeepSwipe] Invalid message ID: {}", message_id);
            DswipeError::invalid_message_id(message_id, messages.len())
        })
    }

    fn navigation(&self, message_id: usize) -> SwipeNavigation {
        SwipeNavigation {
            source: self.settings.source_tag.clone(),
            message_id,
        }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.settings.enabled {
            Ok(())
        } else {
            Err(DswipeError::Disabled)
        }
    }
}
