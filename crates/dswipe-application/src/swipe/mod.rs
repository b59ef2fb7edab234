//! Swipe orchestration.
//!
//! - `orchestrator`: navigation policy and the generation protocol (`SwipeOrchestrator`)
//! - `session`: per-attempt state (`GenerationSession`)

mod orchestrator;
mod session;


pub use orchestrator::SwipeOrchestrator;
pub use session::{GenerationSession, Resolution};

use serde::Serialize;

/// What a swipe request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwipeOutcome {
    /// Moved to an already stored alternative.
    Navigated { swipe_id: usize },
    /// Generated and stored a new alternative.
    Generated { swipe_id: usize },
    /// Generation was stopped and the transcript rolled back.
    Cancelled,
    /// Generation failed and the transcript rolled back.
    Failed { reason: String },
    /// Handed off to the native swipe navigator.
    Delegated,
    /// Re-inserted the message as a fresh swipe entry.
    Appended,
}

impl SwipeOutcome {
    /// True when the transcript was restored from a snapshot.
    pub fn rolled_back(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed { .. })
    }
}
