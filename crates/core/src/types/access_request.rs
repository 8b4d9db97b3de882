//! Access requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::AccessRequestId;
use super::status::AccessRequestStatus;

/// A prospective investor's request for data room access.
///
/// Submitted unauthenticated from the public site; reviewed by an admin, who
/// may attach notes and an expiry for the eventual account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRequest {
    pub id: AccessRequestId,
    pub email: Email,
    pub full_name: String,
    pub company: String,
    pub message: Option<String>,
    pub status: AccessRequestStatus,
    pub admin_notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
