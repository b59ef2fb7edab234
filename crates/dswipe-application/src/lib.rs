//! Application layer for Deep Swipe.
//!
//! This crate wires the domain types from `dswipe-core` to the chat
//! application's collaborators and implements the swipe orchestration on
//! top of them.

pub mod context;
pub mod swipe;

pub use context::SwipeContext;
pub use swipe::{GenerationSession, SwipeOrchestrator, SwipeOutcome};
