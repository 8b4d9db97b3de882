//! NDA wire records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AcceptanceId, NdaId, UserId};

/// The currently effective NDA text. Unauthenticated-safe read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NdaContent {
    pub nda_id: NdaId,
    pub version: String,
    pub content: String,
    pub effective_date: NaiveDate,
}

/// Whether the calling user has accepted the currently effective NDA.
///
/// The optional fields are populated only when `accepted` is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NdaStatus {
    pub accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub nda_id: Option<NdaId>,
}

/// An immutable acceptance record: who signed which NDA version, when, and
/// from where. Written once per user per version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NdaAcceptance {
    pub id: AcceptanceId,
    pub user_id: UserId,
    pub nda_id: NdaId,
    pub version: String,
    /// Full legal name typed by the signer.
    pub digital_signature: String,
    /// Best-effort client-resolved address, or the literal `"unknown"`.
    pub ip_address: String,
    pub user_agent: String,
    pub accepted_at: DateTime<Utc>,
}
