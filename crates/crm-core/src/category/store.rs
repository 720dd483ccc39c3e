//! The category store.
//!
//! `CategoryStore` is the single owner of the category list and the only
//! writer of `conversation_ids`. Mutations apply to the in-memory list
//! synchronously, rebuild the reverse index, and queue a snapshot on the
//! [`WriteQueue`]. Nothing a mutation does spans an `.await`, so a render pass
//! never observes a half-applied `assign`.

use std::collections::HashSet;
use std::sync::Arc;

use super::index::CategoryIndex;
use super::model::{Category, CategoryTarget};
use super::repository::CategoryRepository;
use super::write_queue::WriteQueue;
use crate::error::Result;

/// Result of [`CategoryStore::assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The conversation now belongs to this category.
    Assigned { category_id: String },
    /// The conversation is uncategorized, either by request or because the
    /// target category no longer exists.
    Uncategorized,
}

/// In-memory category list with write-through persistence.
pub struct CategoryStore {
    categories: Vec<Category>,
    index: CategoryIndex,
    repository: Arc<dyn CategoryRepository>,
    writer: WriteQueue,
}

impl CategoryStore {
    /// Creates an empty store and spawns its write worker.
    ///
    /// Call [`CategoryStore::load`] before anything else.
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        let writer = WriteQueue::spawn(repository.clone());
        Self {
            categories: Vec::new(),
            index: CategoryIndex::default(),
            repository,
            writer,
        }
    }

    /// Replaces the in-memory state with the persisted list.
    ///
    /// Absent data and read failures both yield an empty list.
    pub async fn load(&mut self) -> &[Category] {
        let loaded = match self.repository.load().await {
            Ok(loaded) => loaded.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    "[CategoryStore] Failed to load categories, starting empty: {}",
                    e
                );
                Vec::new()
            }
        };
        self.replace(loaded)
    }

    /// Like [`CategoryStore::load`], but a read failure is returned and the
    /// in-memory state is left untouched.
    pub async fn try_load(&mut self) -> Result<&[Category]> {
        let loaded = self.repository.load().await?;
        Ok(self.replace(loaded.unwrap_or_default()))
    }

    fn replace(&mut self, loaded: Vec<Category>) -> &[Category] {
        self.categories = enforce_exclusive_membership(loaded);
        self.index = CategoryIndex::build(&self.categories);
        tracing::info!(
            "[CategoryStore] Loaded {} categories ({} assigned conversations)",
            self.categories.len(),
            self.index.len()
        );
        &self.categories
    }

    /// Re-reads durable storage after an external change.
    ///
    /// Pending local writes are flushed first so they are not lost behind
    /// the re-read.
    pub async fn reload(&mut self) -> &[Category] {
        // The worker has already logged any failed write.
        let _ = self.writer.flush().await;
        self.load().await
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// The reverse index, current as of the last mutation or load.
    pub fn reverse_index(&self) -> &CategoryIndex {
        &self.index
    }

    /// Creates a category. Returns `None` (and changes nothing) when the
    /// trimmed name is empty.
    pub fn create(&mut self, name: &str) -> Option<Category> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("[CategoryStore] Ignoring create with empty name");
            return None;
        }

        let category = Category::new(name);
        tracing::info!(
            "[CategoryStore] Created category: id={}, name={}",
            category.id,
            category.name
        );
        self.categories.push(category.clone());
        self.commit();
        Some(category)
    }

    /// Renames a category. Returns `false` for an empty name or unknown id.
    pub fn rename(&mut self, category_id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) else {
            return false;
        };

        category.name = name.to_string();
        self.commit();
        true
    }

    /// Deletes a category. Its conversations become uncategorized.
    pub fn delete(&mut self, category_id: &str) -> Option<Category> {
        let position = self.categories.iter().position(|c| c.id == category_id)?;
        let removed = self.categories.remove(position);
        tracing::info!(
            "[CategoryStore] Deleted category: id={}, released {} conversations",
            removed.id,
            removed.len()
        );
        self.commit();
        Some(removed)
    }

    /// Moves a conversation to `target`.
    ///
    /// The conversation is first removed from every category. It is then
    /// appended to the target category if that still exists; an unknown id
    /// leaves it uncategorized.
    pub fn assign(&mut self, conversation_id: &str, target: &CategoryTarget) -> AssignOutcome {
        for category in &mut self.categories {
            category.conversation_ids.retain(|id| id != conversation_id);
        }

        let outcome = match target {
            CategoryTarget::Uncategorized => AssignOutcome::Uncategorized,
            CategoryTarget::Category(category_id) => {
                match self.categories.iter_mut().find(|c| &c.id == category_id) {
                    Some(category) => {
                        category.conversation_ids.push(conversation_id.to_string());
                        AssignOutcome::Assigned {
                            category_id: category_id.clone(),
                        }
                    }
                    None => {
                        tracing::debug!(
                            "[CategoryStore] Target category {} is gone; {} left uncategorized",
                            category_id,
                            conversation_id
                        );
                        AssignOutcome::Uncategorized
                    }
                }
            }
        };

        self.commit();
        outcome
    }

    /// Drops every category and clears durable storage.
    pub fn reset(&mut self) {
        tracing::info!(
            "[CategoryStore] Resetting {} categories",
            self.categories.len()
        );
        self.categories.clear();
        self.index = CategoryIndex::default();
        self.writer.clear();
    }

    /// Waits for queued writes to be attempted and returns the outcome of
    /// the most recent one.
    pub async fn flush(&self) -> Result<()> {
        self.writer.flush().await
    }

    fn commit(&mut self) {
        self.index = CategoryIndex::build(&self.categories);
        self.writer.save(self.categories.clone());
    }
}

/// Drops repeated occurrences of a conversation across (and within)
/// categories, keeping the first in list order.
fn enforce_exclusive_membership(mut categories: Vec<Category>) -> Vec<Category> {
    let mut seen = HashSet::new();
    for category in &mut categories {
        let before = category.conversation_ids.len();
        category
            .conversation_ids
            .retain(|id| seen.insert(id.clone()));
        let dropped = before - category.conversation_ids.len();
        if dropped > 0 {
            tracing::warn!(
                "[CategoryStore] Dropped {} duplicate assignments from category {}",
                dropped,
                category.id
            );
        }
    }
    categories
}
