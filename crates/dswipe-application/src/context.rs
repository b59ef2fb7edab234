//! Collaborators the orchestrator works against.

use dswipe_core::collaborator::{
    ChatPersistence, ChatView, GenerationBackend, ModelInfoProvider, SwipeNavigator,
};
use dswipe_core::signal::StopSignal;
use dswipe_core::transcript::Transcript;
use std::sync::Arc;

/// Everything the orchestrator borrows from the surrounding chat application.
///
/// The transcript and stop signal are handles: clones held by the UI observe
/// the same state the orchestrator mutates.
#[derive(Clone)]
pub struct SwipeContext {
    pub transcript: Transcript,
    pub view: Arc<dyn ChatView>,
    pub backend: Arc<dyn GenerationBackend>,
    pub navigator: Arc<dyn SwipeNavigator>,
    pub persistence: Arc<dyn ChatPersistence>,
    pub model_info: Arc<dyn ModelInfoProvider>,
    pub stop_signal: StopSignal,
}
