//! Category repository trait.

use async_trait::async_trait;

use super::model::Category;
use crate::error::Result;

/// Persistence for the whole category list.
///
/// The list is always read and written as one value.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Loads the persisted list. Returns `None` when nothing was ever saved
    /// or the data was cleared.
    async fn load(&self) -> Result<Option<Vec<Category>>>;

    /// Replaces the persisted list.
    async fn save(&self, categories: &[Category]) -> Result<()>;

    /// Removes the persisted list entirely.
    async fn clear(&self) -> Result<()>;
}
