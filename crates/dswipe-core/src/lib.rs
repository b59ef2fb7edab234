pub mod collaborator;
pub mod config;
pub mod error;
pub mod signal;
pub mod transcript;

// Re-export common error type
pub use error::{DswipeError, Result};
