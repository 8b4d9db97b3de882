//! User wire record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{PermissionLevelId, UserId};
use super::role::UserRole;

/// A portal account as exposed over the wire.
///
/// Password hashes and OTP state never leave the portal; this record is what
/// `/api/auth/me`, `/api/admin-auth/me` and the admin user endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: UserRole,
    /// Capability bundle assigned to this user, if any.
    pub permission_level_id: Option<PermissionLevelId>,
    /// Deactivation is the terminal state; users are never hard-deleted.
    pub is_active: bool,
    /// Optional access expiry, set when the user's permission level has
    /// `has_expiry`.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account can authenticate and use the portal right now.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expiry| now < expiry)
    }
}
