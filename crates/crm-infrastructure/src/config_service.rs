//! Configuration service.
//!
//! Loads `CrmConfig` from `config.toml` through a versioned `FileStorage` and
//! caches it. A missing file means defaults; an unreadable or invalid file is
//! logged and also means defaults, so a bad config never prevents the engine
//! from starting.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};

use crm_core::config::CrmConfig;
use crm_core::error::Result;

use crate::dto::{CRM_CONFIG_ENTITY, create_crm_config_migrator};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<CrmConfig>>>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration, loading it on first access.
    pub fn get_config(&self) -> CrmConfig {
        if let Ok(cached) = self.config.read() {
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!(
                    "[ConfigService] No config at {:?}, using defaults",
                    self.path
                );
                CrmConfig::default()
            }
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Ignoring invalid config at {:?}: {}",
                    self.path,
                    e
                );
                CrmConfig::default()
            }
        };

        if let Ok(mut cache) = self.config.write() {
            *cache = Some(loaded.clone());
        }
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.config.write() {
            *cache = None;
        }
    }

    /// Writes `config` to the config file and refreshes the cache.
    pub fn save_config(&self, config: &CrmConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut storage = self.open_storage()?;
        storage.update_and_save(CRM_CONFIG_ENTITY, vec![config.clone()])?;
        tracing::info!("[ConfigService] Saved config to {:?}", self.path);

        if let Ok(mut cache) = self.config.write() {
            *cache = Some(config.clone());
        }
        Ok(())
    }

    /// Reads the file without creating it; reads stay side-effect free.
    fn load_config(&self) -> Result<Option<CrmConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let storage = self.open_storage()?;
        let configs: Vec<CrmConfig> = storage.query(CRM_CONFIG_ENTITY)?;
        Ok(configs.into_iter().next())
    }

    fn open_storage(&self) -> Result<FileStorage> {
        let migrator = create_crm_config_migrator()?;
        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);
        Ok(FileStorage::new(self.path.clone(), migrator, strategy)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config(), CrmConfig::default());
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "storage_key = [").unwrap();

        let service = ConfigService::new(path);
        assert_eq!(service.get_config(), CrmConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::new(path.clone());

        let mut config = CrmConfig::default();
        config.storage_key = "customKey".to_string();
        config.attach.timeout_ms = 250;
        service.save_config(&config).unwrap();

        let fresh = ConfigService::new(path);
        assert_eq!(fresh.get_config(), config);
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());
        assert_eq!(service.get_config().storage_key, "chatCrmCategories");

        let mut changed = CrmConfig::default();
        changed.storage_key = "changed".to_string();
        ConfigService::new(path).save_config(&changed).unwrap();
        assert_eq!(service.get_config().storage_key, "chatCrmCategories");

        service.invalidate_cache();
        assert_eq!(service.get_config().storage_key, "changed");
    }

    #[test]
    fn test_reading_does_not_create_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        ConfigService::new(path.clone()).get_config();

        assert!(!path.exists());
    }

    #[test]
    fn test_save_writes_versioned_toml_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());

        service.save_config(&CrmConfig::default()).unwrap();
        let mut config = CrmConfig::default();
        config.identity.fallback_prefix = "anon_".to_string();
        service.save_config(&config).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("version = \"1.0.0\""));
        assert!(content.contains("anon_"));
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temporary files left: {:?}", leftovers);
        assert_eq!(ConfigService::new(path).get_config(), config);
    }
}
