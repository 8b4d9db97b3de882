//! Permission levels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PermissionLevelId;

/// A named bundle of capability flags assignable to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionLevel {
    pub id: PermissionLevelId,
    pub name: String,
    pub description: String,
    /// May open documents in the viewer.
    pub can_view: bool,
    /// May download document files.
    pub can_download: bool,
    /// Users on this level get an access expiry stamped at assignment time.
    pub has_expiry: bool,
    /// Per-user lifetime download cap; `None` means unlimited.
    pub max_downloads: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
