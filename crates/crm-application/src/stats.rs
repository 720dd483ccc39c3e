//! Category statistics, as shown by the status popup.

use serde::Serialize;

use crm_core::category::{Category, CategoryRepository};
use crm_core::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Number of categories.
    pub categories: usize,
    /// Number of conversations assigned to any category.
    pub categorized: usize,
}

impl CategoryStats {
    pub fn from_categories(categories: &[Category]) -> Self {
        Self {
            categories: categories.len(),
            categorized: categories.iter().map(Category::len).sum(),
        }
    }
}

/// Reads statistics straight from durable storage, without a running engine.
pub async fn load_statistics(repository: &dyn CategoryRepository) -> Result<CategoryStats> {
    let categories = repository.load().await?.unwrap_or_default();
    Ok(CategoryStats::from_categories(&categories))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_categories_and_assignments() {
        let mut work = Category::new("Work");
        work.conversation_ids = vec!["Alice".into(), "Bob".into()];
        let mut friends = Category::new("Friends");
        friends.conversation_ids = vec!["Carol".into()];

        let stats = CategoryStats::from_categories(&[work, friends, Category::new("Empty")]);

        assert_eq!(
            stats,
            CategoryStats {
                categories: 3,
                categorized: 3
            }
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(CategoryStats::from_categories(&[]), CategoryStats::default());
    }
}
