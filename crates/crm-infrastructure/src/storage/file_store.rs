//! File-backed key-value store.
//!
//! Each namespace is one JSON object on disk, `{storage_dir}/{namespace}.json`,
//! mapping keys to values. File I/O runs on the blocking pool.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crm_core::error::{CrmError, Result};
use crm_core::storage::KeyValueStore;

use super::atomic_json::AtomicJsonFile;

type Namespace = Map<String, Value>;

/// Durable store over one JSON file per namespace.
#[derive(Clone)]
pub struct FileKeyValueStore {
    file: Arc<AtomicJsonFile<Namespace>>,
}

impl FileKeyValueStore {
    /// Default namespace, mirroring the browser's "local" storage area.
    pub const DEFAULT_NAMESPACE: &'static str = "local";

    pub fn new(storage_dir: &Path, namespace: &str) -> Self {
        Self::with_path(storage_dir.join(format!("{}.json", namespace)))
    }

    /// Creates a store over an explicit file path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicJsonFile<Namespace>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| CrmError::internal(format!("Failed to join storage task: {}", e)))?
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = key.to_string();
        self.blocking(move |file| {
            let namespace = file.load()?;
            Ok(namespace.and_then(|mut map| map.remove(&key)))
        })
        .await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            file.update(Namespace::new(), |map| {
                map.insert(key, value);
            })?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            if file.load()?.is_none() {
                return Ok(());
            }
            file.update(Namespace::new(), |map| {
                map.remove(&key);
            })?;
            Ok(())
        })
        .await
    }
}
