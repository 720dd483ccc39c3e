//! Durable key-value storage trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A namespaced durable key-value store.
///
/// Values are structured JSON. An absent key is `Ok(None)`, never an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
