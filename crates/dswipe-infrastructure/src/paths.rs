//! Path management for Deep Swipe configuration files.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "deep-swipe";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for Deep Swipe.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/deep-swipe/        # Config directory (platform default)
/// ├── config.toml              # Settings ([swipe] table)
/// └── logs/                    # CLI logs
/// ```
///
/// A base override replaces the platform config directory, which keeps
/// tests and the CLI's `--config-dir` away from the user's real files.
#[derive(Debug, Clone, Default)]
pub struct DswipePaths {
    base: Option<PathBuf>,
}

impl DswipePaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the Deep Swipe configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = DswipePaths::new(Some(PathBuf::from("/tmp/dswipe-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/dswipe-test/config.toml")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/dswipe-test/logs")
        );
    }

    #[test]
    fn test_default_config_dir_ends_with_app_name() {
        // Headless CI may lack a config dir; only check when one resolves.
        if let Ok(config_dir) = DswipePaths::default().config_dir() {
            assert!(config_dir.ends_with(APP_DIR_NAME));
            let config_file = DswipePaths::default().config_file().unwrap();
            assert!(config_file.starts_with(&config_dir));
        }
    }
}
