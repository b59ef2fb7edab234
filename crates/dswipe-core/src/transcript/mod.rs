//! Transcript domain module.
//!
//! # Module Structure
//!
//! - `message`: Chat message types (`ChatMessage`, `MessageRole`, `SwipeInfo`)
//! - `model`: The shared transcript handle (`Transcript`)
//! - `snapshot`: Rollback snapshots (`TranscriptSnapshot`)

mod message;
mod model;
mod snapshot;

pub use message::{ChatMessage, MessageRole, SwipeInfo};
pub use model::Transcript;
pub use snapshot::TranscriptSnapshot;
