//! Storage boundary for the portal.
//!
//! The real deployment target keeps investor data in an external backend;
//! everything the portal needs sits behind this module so that boundary is
//! one seam. [`MemoryStore`] is the in-process implementation used for
//! local/demo mode and tests - non-persistent, reset on restart.

pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use thiserror::Error;

use ridgeline_core::{Document, Email, OtpPurpose, User, UserId};

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The operation violates a uniqueness or referential constraint.
    #[error("{0}")]
    Conflict(String),

    /// A lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// A portal account plus server-only secrets.
///
/// The wire-level [`User`] is what leaves the portal; the password hash
/// (admins only) never does.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: Option<String>,
}

/// A live bearer-token session. One token maps to exactly one user.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the session is past its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A pending OTP challenge, keyed by `(email, purpose)`.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u8,
}

/// Key for the OTP challenge table.
pub type OtpKey = (Email, OtpPurpose);

/// Document metadata plus the uploaded file bytes.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub document: Document,
    pub bytes: Vec<u8>,
}
