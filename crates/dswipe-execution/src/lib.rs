//! Runtime plumbing around the swipe orchestrator.

pub mod tracing_layer;

pub use tracing_layer::{SwipeEvent, SwipeEventLayer};
