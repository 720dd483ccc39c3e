//! In-memory key-value store.
//!
//! Used by hosts without durable storage and by tests. Writes can be made to
//! fail on demand to exercise the engine's degraded mode.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crm_core::error::{CrmError, Result};
use crm_core::storage::KeyValueStore;

#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CrmError::storage("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check_available()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.check_available()?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}
