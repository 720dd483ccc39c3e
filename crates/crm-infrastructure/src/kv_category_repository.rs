//! Category repository over a key-value store.
//!
//! The whole list lives under a single key as
//! `[{ "id", "name", "conversationIds": [...] }, ...]`. There is no schema
//! version field; lists written by older builds with `conversations` instead
//! of `conversationIds` still deserialize.
//!
//! When the configured key is absent the legacy keys are read in order. The
//! next save lands under the configured key, and `clear` removes every key so
//! a reset never resurrects legacy data.

use async_trait::async_trait;
use std::sync::Arc;

use crm_core::category::{Category, CategoryRepository};
use crm_core::config::{DEFAULT_STORAGE_KEY, LEGACY_STORAGE_KEYS};
use crm_core::error::Result;
use crm_core::storage::KeyValueStore;

pub struct KvCategoryRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    legacy_keys: Vec<String>,
}

impl KvCategoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let legacy_keys = LEGACY_STORAGE_KEYS
            .iter()
            .filter(|legacy| **legacy != key)
            .map(|legacy| legacy.to_string())
            .collect();
        Self {
            store,
            key,
            legacy_keys,
        }
    }

    /// Replaces the keys read when the configured key is absent.
    pub fn with_legacy_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Creates a repository using [`DEFAULT_STORAGE_KEY`].
    pub fn with_default_key(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl CategoryRepository for KvCategoryRepository {
    async fn load(&self) -> Result<Option<Vec<Category>>> {
        if let Some(categories) = self.read_key(&self.key).await? {
            return Ok(Some(categories));
        }
        for legacy in &self.legacy_keys {
            if let Some(categories) = self.read_key(legacy).await? {
                tracing::info!(
                    "[KvCategoryRepository] Read {} categories from legacy key '{}'",
                    categories.len(),
                    legacy
                );
                return Ok(Some(categories));
            }
        }
        Ok(None)
    }

    async fn save(&self, categories: &[Category]) -> Result<()> {
        let value = serde_json::to_value(categories)?;
        self.store.set(&self.key, value).await
    }

    async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await?;
        for legacy in &self.legacy_keys {
            self.store.remove(legacy).await?;
        }
        Ok(())
    }
}

impl KvCategoryRepository {
    async fn read_key(&self, key: &str) -> Result<Option<Vec<Category>>> {
        match self.store.get(key).await? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}
