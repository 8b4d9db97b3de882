//! Investor-facing API client.

use std::sync::Arc;

use reqwest::Method;

use ridgeline_core::{
    CategoryId, Document, DocumentCategory, DocumentId, Email, NdaAcceptance, NdaContent,
    NdaStatus, OtpPurpose, PermissionLevel, QaThread, User,
};

use crate::error::{ClientError, Result};
use crate::http::{Http, USER_AGENT};
use crate::ip::resolve_public_ip;
use crate::token::{TokenKey, TokenStore};
use crate::types::{
    AccessRequestForm, DirectUrl, DocumentFilter, MessageResponse, NdaAcceptancePayload,
    OtpRequested, QuestionForm, TokenResponse,
};

/// Single point of HTTP access to the portal for investor flows.
///
/// Holds the investor session token through a [`TokenStore`]; absence of a
/// token is a valid state (anonymous). Every non-2xx answer surfaces as a
/// typed [`ClientError`]; there is no retry and no backoff.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: Http,
}

impl PortalClient {
    /// Create a client against `base_url`, persisting the investor token in
    /// `store`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an unparseable base URL.
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            http: Http::new(base_url, store, TokenKey::Investor)?,
        })
    }

    /// Whether a token is currently held.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenStore` if the store cannot be read.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.http.token()?.is_some())
    }

    /// Best-effort backend warm-up ping (5-second timeout, never fails).
    pub async fn warm_up(&self) -> bool {
        self.http.warm_up().await
    }

    // =========================================================================
    // OTP login
    // =========================================================================

    /// Request a one-time login code for `email`.
    ///
    /// The backend reports success whether or not the email is registered.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a malformed
    /// address.
    pub async fn request_otp(&self, email: &str) -> Result<OtpRequested> {
        let email = parse_email(email)?;
        self.http
            .send(
                Method::POST,
                "/api/auth/request-otp",
                Some(&serde_json::json!({"email": email})),
            )
            .await
    }

    /// Exchange a 6-digit code for a bearer token; the token is persisted.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) unless the code is
    /// exactly 6 ASCII digits.
    pub async fn verify_otp(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<TokenResponse> {
        let email = parse_email(email)?;
        let code = code.trim();
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::Validation(
                "Verification code must be 6 digits".to_string(),
            ));
        }

        let response: TokenResponse = self
            .http
            .send(
                Method::POST,
                "/api/auth/verify-otp",
                Some(&serde_json::json!({
                    "email": email,
                    "otp_code": code,
                    "purpose": purpose,
                })),
            )
            .await?;
        self.http.save_token(&response.access_token)?;
        Ok(response)
    }

    /// The current user record.
    ///
    /// # Errors
    ///
    /// A 401 clears the stored token before the error is returned.
    pub async fn me(&self) -> Result<User> {
        self.http
            .send(Method::GET, "/api/auth/me", None::<&()>)
            .await
    }

    /// Destroy the server-side session and drop the stored token.
    ///
    /// # Errors
    ///
    /// The token is cleared locally even if the backend call fails.
    pub async fn logout(&self) -> Result<()> {
        let result: Result<MessageResponse> = self
            .http
            .send(Method::POST, "/api/auth/logout", None::<&()>)
            .await;
        self.http.clear_token()?;
        result.map(|_| ())
    }

    // =========================================================================
    // NDA
    // =========================================================================

    /// The currently effective NDA text. Unauthenticated-safe.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn nda_content(&self) -> Result<NdaContent> {
        self.http
            .send(Method::GET, "/api/nda/content", None::<&()>)
            .await
    }

    /// The caller's acceptance status for the current NDA version.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn nda_status(&self) -> Result<NdaStatus> {
        self.http
            .send(Method::GET, "/api/nda/status", None::<&()>)
            .await
    }

    /// Record acceptance of the current NDA version.
    ///
    /// `confirmed` is the checkbox: acceptance is refused client-side until
    /// it is set and the signature is non-empty. The payload always carries
    /// a `user_agent` and an `ip_address` that is either a resolved address
    /// or the literal `"unknown"` - a failed IP lookup never blocks
    /// acceptance.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) when unconfirmed
    /// or unsigned; re-accepting the current version is a 409 from the
    /// backend.
    pub async fn accept_nda(&self, digital_signature: &str, confirmed: bool) -> Result<NdaAcceptance> {
        if !confirmed {
            return Err(ClientError::Validation(
                "You must confirm the agreement to continue".to_string(),
            ));
        }
        let signature = digital_signature.trim();
        if signature.is_empty() {
            return Err(ClientError::Validation(
                "Full legal name is required".to_string(),
            ));
        }

        let payload = NdaAcceptancePayload {
            digital_signature: signature.to_string(),
            ip_address: resolve_public_ip().await,
            user_agent: USER_AGENT.to_string(),
        };
        self.http
            .send(Method::POST, "/api/nda/accept", Some(&payload))
            .await
    }

    // =========================================================================
    // Data room
    // =========================================================================

    /// Folder listing, optionally scoped to a parent.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn categories(&self, parent_id: Option<CategoryId>) -> Result<Vec<DocumentCategory>> {
        let path = parent_id.map_or_else(
            || "/api/documents/categories".to_string(),
            |id| format!("/api/documents/categories?parent_id={id}"),
        );
        self.http.send(Method::GET, &path, None::<&()>).await
    }

    /// Documents in a folder, filtered by search text and tag.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn documents_in_category(
        &self,
        category_id: CategoryId,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>> {
        let path = format!(
            "/api/documents/category/{category_id}/documents{}",
            filter.query()
        );
        self.http.send(Method::GET, &path, None::<&()>).await
    }

    /// Document metadata.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn document(&self, id: DocumentId) -> Result<Document> {
        self.http
            .send(Method::GET, &format!("/api/documents/{id}"), None::<&()>)
            .await
    }

    /// Download the document file (logged server-side).
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn download(&self, id: DocumentId) -> Result<Vec<u8>> {
        self.http
            .send_bytes(Method::GET, &format!("/api/documents/{id}/download"))
            .await
    }

    /// Fetch the document bytes for inline viewing (logged server-side).
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn view(&self, id: DocumentId) -> Result<Vec<u8>> {
        self.http
            .send_bytes(Method::GET, &format!("/api/documents/{id}/view"))
            .await
    }

    /// A short-lived direct link to the document.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn document_url(&self, id: DocumentId) -> Result<DirectUrl> {
        self.http
            .send(Method::GET, &format!("/api/documents/{id}/url"), None::<&()>)
            .await
    }

    /// All permission levels.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn permission_levels(&self) -> Result<Vec<PermissionLevel>> {
        self.http
            .send(Method::GET, "/api/permissions/levels", None::<&()>)
            .await
    }

    // =========================================================================
    // Access requests
    // =========================================================================

    /// Submit a prospective-investor access request (public, no token).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) when `email`,
    /// `full_name` or `company` is missing or malformed.
    pub async fn submit_access_request(
        &self,
        form: &AccessRequestForm,
    ) -> Result<ridgeline_core::AccessRequest> {
        parse_email(&form.email)?;
        if form.full_name.trim().is_empty() {
            return Err(ClientError::Validation("Full name is required".to_string()));
        }
        if form.company.trim().is_empty() {
            return Err(ClientError::Validation("Company is required".to_string()));
        }
        self.http
            .send(Method::POST, "/api/access-requests", Some(form))
            .await
    }

    // =========================================================================
    // Q&A
    // =========================================================================

    /// Ask a question.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a blank
    /// question.
    pub async fn submit_question(&self, form: &QuestionForm) -> Result<QaThread> {
        if form.question.trim().is_empty() {
            return Err(ClientError::Validation("Question is required".to_string()));
        }
        self.http
            .send(Method::POST, "/api/qa/questions", Some(form))
            .await
    }

    /// Threads visible to the caller (own plus public).
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn threads(&self) -> Result<Vec<QaThread>> {
        self.http
            .send(Method::GET, "/api/qa/threads", None::<&()>)
            .await
    }

    /// Search visible threads.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn search_qa(&self, query: &str) -> Result<Vec<QaThread>> {
        let path = format!("/api/qa/search?q={}", crate::types::urlencode(query));
        self.http.send(Method::GET, &path, None::<&()>).await
    }
}

/// Parse and normalize an email, mapping failures to a validation error.
fn parse_email(email: &str) -> Result<Email> {
    Email::parse(email).map_err(|e| ClientError::Validation(format!("Email is invalid: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    fn client() -> PortalClient {
        // Port 9 is unroutable locally, so any test that accidentally hits
        // the network fails fast instead of passing against a live server.
        PortalClient::new("http://127.0.0.1:9", Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_otp_code_fails_without_network() {
        let client = client();
        for code in ["12345", "1234567", "12ab56", ""] {
            let err = client
                .verify_otp("lp@fund.com", code, OtpPurpose::Login)
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)), "code {code:?}");
        }
    }

    #[tokio::test]
    async fn test_malformed_email_fails_without_network() {
        let client = client();
        let err = client.request_otp("not-an-email").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_nda_acceptance_requires_confirmation_and_signature() {
        let client = client();

        let err = client.accept_nda("A. Investor", false).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let err = client.accept_nda("   ", true).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_access_request_requires_all_fields() {
        let client = client();
        let forms = [
            AccessRequestForm {
                email: "bad".to_string(),
                full_name: "P".to_string(),
                company: "C".to_string(),
                message: None,
            },
            AccessRequestForm {
                email: "p@capital.com".to_string(),
                full_name: " ".to_string(),
                company: "C".to_string(),
                message: None,
            },
            AccessRequestForm {
                email: "p@capital.com".to_string(),
                full_name: "P".to_string(),
                company: String::new(),
                message: None,
            },
        ];
        for form in &forms {
            let err = client.submit_access_request(form).await.unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_blank_question_fails_without_network() {
        let client = client();
        let err = client
            .submit_question(&QuestionForm {
                question: "  ".to_string(),
                category: None,
                is_urgent: false,
                is_public: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err =
            PortalClient::new("not a url", Arc::new(MemoryTokenStore::new())).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
