pub mod config_service;
pub mod paths;
pub mod storage;
pub mod transcript_file;

pub use crate::config_service::ConfigService;
pub use crate::paths::DswipePaths;
pub use crate::transcript_file::TranscriptFile;
