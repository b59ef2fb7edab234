//! Backend identity lookup.

use serde::{Deserialize, Serialize};

const UNKNOWN_MODEL: &str = "unknown";

/// Identifies which backend and model are generating.
pub trait ModelInfoProvider: Send + Sync {
    fn generating_api(&self) -> Option<String>;
    fn generating_model(&self) -> Option<String>;

    /// Current api/model pair, with the model defaulting to `"unknown"`.
    fn current(&self) -> ModelInfo {
        ModelInfo {
            api: self.generating_api(),
            model: self
                .generating_model()
                .filter(|model| !model.is_empty())
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
        }
    }
}

/// Snapshot of backend identity recorded alongside generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub api: Option<String>,
    pub model: String,
}
