//! Configuration service implementation.
//!
//! Loads the `[swipe]` table of `config.toml` (~/.config/deep-swipe/config.toml)
//! into [`SwipeSettings`] and caches it.

use crate::paths::DswipePaths;
use crate::storage::{ConfigStorage, ConfigStorageError};
use dswipe_core::config::SwipeSettings;
use dswipe_core::{DswipeError, Result};
use std::sync::{Arc, RwLock};

const SWIPE_TABLE: &str = "swipe";

/// Configuration service that loads and caches swipe settings.
#[derive(Clone)]
pub struct ConfigService {
    storage: Arc<ConfigStorage>,
    settings: Arc<RwLock<Option<SwipeSettings>>>,
}

impl ConfigService {
    /// Creates a service backed by the platform config file.
    pub fn new() -> Result<Self> {
        Self::with_paths(&DswipePaths::default())
    }

    pub fn with_paths(paths: &DswipePaths) -> Result<Self> {
        let config_file = paths
            .config_file()
            .map_err(|e| DswipeError::config(e.to_string()))?;

        Ok(Self {
            storage: Arc::new(ConfigStorage::new(config_file)),
            settings: Arc::new(RwLock::new(None)),
        })
    }

    /// Gets the swipe settings, loading from file if not cached.
    ///
    /// A missing file or a missing `[swipe]` table yields the defaults. A
    /// malformed table is an error rather than a silent fallback.
    pub fn get_settings(&self) -> Result<SwipeSettings> {
        {
            let cached = self.settings.read().unwrap_or_else(|p| p.into_inner());
            if let Some(settings) = cached.as_ref() {
                return Ok(settings.clone());
            }
        }

        let loaded = self.load_settings()?;
        tracing::debug!(
            "[ConfigService] Loaded settings from {}",
            self.storage.path().display()
        );

        let mut cached = self.settings.write().unwrap_or_else(|p| p.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Writes `settings` into the `[swipe]` table, keeping the rest of the
    /// file, and refreshes the cache.
    pub fn save_settings(&self, settings: &SwipeSettings) -> Result<()> {
        let table = match toml::Value::try_from(settings)? {
            toml::Value::Table(table) => table,
            other => {
                return Err(DswipeError::internal(format!(
                    "settings serialized to {}",
                    other.type_str()
                )));
            }
        };

        self.storage
            .update(|document| {
                document.insert(SWIPE_TABLE.to_string(), toml::Value::Table(table));
                Ok(())
            })
            .map_err(storage_error)?;

        let mut cached = self.settings.write().unwrap_or_else(|p| p.into_inner());
        *cached = Some(settings.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.settings.write().unwrap_or_else(|p| p.into_inner());
        *cached = None;
    }

    fn load_settings(&self) -> Result<SwipeSettings> {
        let Some(mut document) = self.storage.load().map_err(storage_error)? else {
            return Ok(SwipeSettings::default());
        };

        match document.remove(SWIPE_TABLE) {
            Some(table @ toml::Value::Table(_)) => Ok(table.try_into()?),
            Some(other) => Err(DswipeError::config(format!(
                "[{}] must be a table, found {}",
                SWIPE_TABLE,
                other.type_str()
            ))),
            None => Ok(SwipeSettings::default()),
        }
    }
}

fn storage_error(err: ConfigStorageError) -> DswipeError {
    match err {
        ConfigStorageError::IoError(e) => e.into(),
        ConfigStorageError::TomlParseError(e) => e.into(),
        ConfigStorageError::TomlSerError(e) => e.into(),
        ConfigStorageError::LockError(message) => DswipeError::config(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dswipe_core::config::BusyPolicy;
    use std::fs;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ConfigService {
        ConfigService::with_paths(&DswipePaths::new(Some(dir.path().to_path_buf()))).unwrap()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(service(&dir).get_settings().unwrap(), SwipeSettings::default());
    }

    #[test]
    fn test_reads_swipe_table() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[swipe]\nenabled = false\nbusy_policy = \"cancel_and_replace\"\n",
        )
        .unwrap();

        let settings = service(&dir).get_settings().unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.busy_policy, BusyPolicy::CancelAndReplace);
        assert_eq!(settings.source_tag, "deep-swipe");
    }

    #[test]
    fn test_non_table_swipe_entry_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "swipe = 3\n").unwrap();

        let err = service(&dir).get_settings().unwrap_err();
        assert!(matches!(err, DswipeError::Config(_)));
    }

    #[test]
    fn test_cache_until_invalidated() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        assert!(service.get_settings().unwrap().enabled);

        fs::write(dir.path().join("config.toml"), "[swipe]\nenabled = false\n").unwrap();
        assert!(service.get_settings().unwrap().enabled);

        service.invalidate_cache();
        assert!(!service.get_settings().unwrap().enabled);
    }

    #[test]
    fn test_save_keeps_other_tables() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[ui]\ntheme = \"dark\"\n").unwrap();
        let service = service(&dir);

        let settings = SwipeSettings {
            generation_timeout_secs: Some(45),
            ..Default::default()
        };
        service.save_settings(&settings).unwrap();
        service.invalidate_cache();

        assert_eq!(service.get_settings().unwrap(), settings);
        let raw = fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(raw.contains("theme = \"dark\""));
    }
}
