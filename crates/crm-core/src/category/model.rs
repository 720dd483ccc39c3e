//! Category domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Sentinel drop-zone id meaning "no category".
pub const UNCATEGORIZED: &str = "uncategorized";

/// A user-defined category and the conversations assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Generated at creation, never changes.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Assigned conversation identifiers in insertion order.
    /// Older data stored this list under `conversations`.
    #[serde(default, alias = "conversations")]
    pub conversation_ids: Vec<String>,
}

impl Category {
    /// Creates an empty category with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_category_id(),
            name: name.into(),
            conversation_ids: Vec::new(),
        }
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        self.conversation_ids.iter().any(|id| id == conversation_id)
    }

    pub fn len(&self) -> usize {
        self.conversation_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation_ids.is_empty()
    }
}

fn generate_category_id() -> String {
    format!("category_{}", Uuid::new_v4().simple())
}

/// Where a conversation should end up: a category, or nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryTarget {
    Uncategorized,
    Category(String),
}

impl CategoryTarget {
    /// Parses a zone id as rendered on the page; the sentinel maps to
    /// [`CategoryTarget::Uncategorized`].
    pub fn parse(zone_id: &str) -> Self {
        if zone_id == UNCATEGORIZED {
            Self::Uncategorized
        } else {
            Self::Category(zone_id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Uncategorized => UNCATEGORIZED,
            Self::Category(id) => id,
        }
    }
}

impl From<&str> for CategoryTarget {
    fn from(zone_id: &str) -> Self {
        Self::parse(zone_id)
    }
}

impl fmt::Display for CategoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
