//! Document, category and access-log wire records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AccessLogId, CategoryId, DocumentId, UserId};
use super::status::DocumentAction;

/// A folder in the data room. One level of nesting (`parent_id`) is enough
/// for the "Financials / Q3" style hierarchy investors expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentCategory {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
}

/// Document metadata. The file bytes themselves are only reachable through
/// the download/view endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub tags: Vec<String>,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Case-insensitive match against title, description and tags, used by
    /// the category listing's `search` filter.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// One view/download event against a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessLogEntry {
    pub id: AccessLogId,
    pub document_id: DocumentId,
    pub user_id: UserId,
    pub action: DocumentAction,
    pub occurred_at: DateTime<Utc>,
}
