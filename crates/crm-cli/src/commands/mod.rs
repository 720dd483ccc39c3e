pub mod categories;
pub mod config;
pub mod reset;
pub mod stats;

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crm_application::Confirmation;
use crm_core::category::{CategoryRepository, CategoryStore};
use crm_core::config::CrmConfig;
use crm_infrastructure::{ConfigService, CrmPaths, FileKeyValueStore, KvCategoryRepository};

/// Storage and configuration resolved from the command line.
pub struct Workspace {
    pub config: CrmConfig,
    pub storage_file: PathBuf,
    pub repository: Arc<dyn CategoryRepository>,
}

impl Workspace {
    pub fn open(paths: &CrmPaths) -> Result<Self> {
        let config = ConfigService::new(paths.config_file()?).get_config();
        let storage_dir = paths.storage_dir()?;
        let kv = FileKeyValueStore::new(&storage_dir, FileKeyValueStore::DEFAULT_NAMESPACE);
        let storage_file = kv.path().to_path_buf();
        tracing::debug!(
            "[Workspace] Storage file {:?}, key '{}'",
            storage_file,
            config.storage_key
        );
        let repository: Arc<dyn CategoryRepository> = Arc::new(KvCategoryRepository::new(
            Arc::new(kv),
            config.storage_key.clone(),
        ));

        Ok(Self {
            config,
            storage_file,
            repository,
        })
    }

    /// Loads the persisted categories. Unlike the engine, the CLI refuses to
    /// work on an unreadable store, since its next write would replace it.
    pub async fn load_store(&self) -> Result<CategoryStore> {
        let mut store = CategoryStore::new(self.repository.clone());
        store
            .try_load()
            .await
            .with_context(|| format!("Failed to read {}", self.storage_file.display()))?;
        Ok(store)
    }
}

/// Waits for the store's queued writes and fails if the last one did not
/// reach disk.
pub async fn persist(store: &CategoryStore) -> Result<()> {
    store.flush().await.context("Failed to persist categories")
}

/// Asks a yes/no question on stdin unless `yes` was given.
pub fn confirm(prompt: &str, yes: bool) -> Result<Confirmation> {
    if yes {
        return Ok(Confirmation::Confirmed);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    let answer = answer.trim().to_lowercase();
    Ok(Confirmation::from(answer == "y" || answer == "yes"))
}
