//! Collaborator interfaces.
//!
//! Deep Swipe orchestrates work that other parts of the chat application
//! perform. These traits decouple the orchestration from the concrete UI,
//! generation backend and chat store.
//!
//! # Module Structure
//!
//! - `chat`: View and persistence hooks of the chat store (`ChatView`, `ChatPersistence`)
//! - `generation`: The external generation backend (`GenerationBackend`)
//! - `navigation`: Built-in swipe navigation for assistant messages (`SwipeNavigator`)
//! - `model_info`: Backend identity lookup (`ModelInfoProvider`)

mod chat;
mod generation;
mod model_info;
mod navigation;

pub use chat::{AddMessageKind, AddMessageOptions, ChatPersistence, ChatView};
pub use generation::{GenerationBackend, GenerationOutput, GenerationRequest};
pub use model_info::{ModelInfo, ModelInfoProvider};
pub use navigation::{SwipeNavigation, SwipeNavigator};
