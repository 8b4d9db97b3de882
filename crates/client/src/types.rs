//! Wire envelopes and request payloads for the SDK surface.
//!
//! Entity records live in `ridgeline-core`; this module holds only the
//! request/response shapes that exist at the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ridgeline_core::{AccessRequestStatus, CategoryId, PermissionLevelId, UserRole};

/// Response envelope for `POST /api/auth/request-otp`.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpRequested {
    pub message: String,
    pub expires_in_minutes: i64,
}

/// Response envelope for the token-yielding auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Response envelope for message-only endpoints (logout, password change).
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response envelope for `GET /api/documents/{id}/url`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectUrl {
    pub url: String,
    pub expires_in_seconds: u64,
}

/// Payload for `POST /api/nda/accept`, assembled by the SDK.
#[derive(Debug, Clone, Serialize)]
pub struct NdaAcceptancePayload {
    pub digital_signature: String,
    /// A resolved address, or the literal `"unknown"` when the IP lookup
    /// failed.
    pub ip_address: String,
    pub user_agent: String,
}

/// Payload for `POST /api/access-requests`.
#[derive(Debug, Clone, Serialize)]
pub struct AccessRequestForm {
    pub email: String,
    pub full_name: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Filters for the category document listing.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
}

impl DocumentFilter {
    /// Render as a query string suffix (empty when no filter is set).
    #[must_use]
    pub fn query(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(format!("search={}", urlencode(search)));
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(format!("tag={}", urlencode(tag)));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// Payload for `POST /api/qa/questions`.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionForm {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_urgent: bool,
    pub is_public: bool,
}

/// Payload for `POST /api/admin-auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminRegistration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Payload for `POST /api/admin/users`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level_id: Option<PermissionLevelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Payload for `PUT /api/admin/users/{id}`. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// `Some(None)` serializes as an explicit `null`, which clears the
    /// assignment server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level_id: Option<Option<PermissionLevelId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Payload for the permission level create/update endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionLevelForm {
    pub name: String,
    pub description: String,
    pub can_view: bool,
    pub can_download: bool,
    pub has_expiry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_downloads: Option<u32>,
}

/// Payload for `PUT /api/admin/access-requests/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessRequestReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccessRequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A document upload: metadata plus the file to send as multipart.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub tags: Vec<String>,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Payload for `POST /api/documents/categories`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
}

/// Minimal percent-encoding for query values.
pub(crate) fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_filter_query() {
        assert_eq!(DocumentFilter::default().query(), "");
        assert_eq!(
            DocumentFilter {
                search: Some("cap table".to_string()),
                tag: None,
            }
            .query(),
            "?search=cap%20table"
        );
        assert_eq!(
            DocumentFilter {
                search: Some("q3".to_string()),
                tag: Some("financials".to_string()),
            }
            .query(),
            "?search=q3&tag=financials"
        );
    }

    #[test]
    fn test_user_update_serializes_explicit_null() {
        let update = UserUpdate {
            permission_level_id: Some(None),
            ..UserUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("permission_level_id").unwrap().is_null());
        assert!(json.get("full_name").is_none());
    }
}
