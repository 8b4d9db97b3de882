//! Q&A wire records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{QaThreadId, UserId};
use super::status::QaStatus;

/// A question asked by an investor, optionally answered by an admin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaThread {
    pub id: QaThreadId,
    pub question: String,
    pub category: Option<String>,
    pub is_urgent: bool,
    /// Public threads are visible to every investor, not just the asker.
    pub is_public: bool,
    pub asked_by: UserId,
    pub status: QaStatus,
    pub answer: Option<String>,
    pub answered_by: Option<UserId>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl QaThread {
    /// Whether `user_id` may see this thread in investor listings.
    #[must_use]
    pub fn visible_to(&self, user_id: UserId) -> bool {
        self.is_public || self.asked_by == user_id
    }
}
