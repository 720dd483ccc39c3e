//! Reverse lookup from conversation to category.

use std::collections::HashMap;

use super::model::Category;

/// Derived `conversation id -> category id` map.
///
/// Only ever built from a category list; the list stays the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    by_conversation: HashMap<String, String>,
}

impl CategoryIndex {
    /// Builds the index. If a conversation appears in more than one category
    /// the first category in list order wins.
    pub fn build(categories: &[Category]) -> Self {
        let mut by_conversation = HashMap::new();
        for category in categories {
            for conversation_id in &category.conversation_ids {
                by_conversation
                    .entry(conversation_id.clone())
                    .or_insert_with(|| category.id.clone());
            }
        }
        Self { by_conversation }
    }

    pub fn category_of(&self, conversation_id: &str) -> Option<&str> {
        self.by_conversation.get(conversation_id).map(String::as_str)
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        self.by_conversation.contains_key(conversation_id)
    }

    pub fn len(&self) -> usize {
        self.by_conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_conversation.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_conversation
            .iter()
            .map(|(conversation, category)| (conversation.as_str(), category.as_str()))
    }
}
