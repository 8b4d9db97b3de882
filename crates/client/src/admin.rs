//! Admin-scoped API client.
//!
//! Same shape as [`crate::PortalClient`], scoped to the admin endpoints and
//! holding its own token under a separate storage key - logging in as an
//! admin never touches an investor session in the same store. Document
//! creation is the one non-JSON call: a raw multipart upload.

use std::sync::Arc;

use reqwest::{Method, multipart};

use ridgeline_core::{
    AccessLogEntry, AccessRequest, AccessRequestId, AccessRequestStatus, Document,
    DocumentCategory, DocumentId, Email, PermissionLevel, PermissionLevelId, QaThread,
    QaThreadId, User, UserId,
};

use crate::error::{ClientError, Result};
use crate::http::Http;
use crate::token::{TokenKey, TokenStore};
use crate::types::{
    AccessRequestReview, AdminRegistration, CategoryForm, DocumentUpload, MessageResponse,
    NewUser, PermissionLevelForm, TokenResponse, UserUpdate,
};

/// Single point of HTTP access to the portal's admin surface.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Http,
}

impl AdminClient {
    /// Create a client against `base_url`, persisting the admin token in
    /// `store` under its own key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an unparseable base URL.
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self {
            http: Http::new(base_url, store, TokenKey::Admin)?,
        })
    }

    /// Whether an admin token is currently held.
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
    // Admin auth
    // =========================================================================

    /// Register an admin account; the returned token is persisted.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a malformed
    /// email or blank name.
    pub async fn register(&self, registration: &AdminRegistration) -> Result<TokenResponse> {
        Email::parse(&registration.email)
            .map_err(|e| ClientError::Validation(format!("Email is invalid: {e}")))?;
        if registration.full_name.trim().is_empty() {
            return Err(ClientError::Validation("Full name is required".to_string()));
        }

        let response: TokenResponse = self
            .http
            .send(Method::POST, "/api/admin-auth/register", Some(registration))
            .await?;
        self.http.save_token(&response.access_token)?;
        Ok(response)
    }

    /// Password login; the returned token is persisted.
    ///
    /// # Errors
    ///
    /// Returns the typed error on bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let response: TokenResponse = self
            .http
            .send(
                Method::POST,
                "/api/admin-auth/login",
                Some(&serde_json::json!({"email": email, "password": password})),
            )
            .await?;
        self.http.save_token(&response.access_token)?;
        Ok(response)
    }

    /// Own profile.
    ///
    /// # Errors
    ///
    /// A 401 clears the stored token before the error is returned.
    pub async fn me(&self) -> Result<User> {
        self.http
            .send(Method::GET, "/api/admin-auth/me", None::<&()>)
            .await
    }

    /// Update own display name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a blank name.
    pub async fn update_profile(&self, full_name: &str) -> Result<User> {
        if full_name.trim().is_empty() {
            return Err(ClientError::Validation("Full name is required".to_string()));
        }
        self.http
            .send(
                Method::PUT,
                "/api/admin-auth/me",
                Some(&serde_json::json!({"full_name": full_name})),
            )
            .await
    }

    /// Rotate the password.
    ///
    /// # Errors
    ///
    /// Returns the typed error if the current password does not verify.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let _: MessageResponse = self
            .http
            .send(
                Method::POST,
                "/api/admin-auth/change-password",
                Some(&serde_json::json!({
                    "current_password": current,
                    "new_password": new,
                })),
            )
            .await?;
        Ok(())
    }

    /// Drop the stored admin token (local logout).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::TokenStore` if the store cannot be written.
    pub fn forget_token(&self) -> Result<()> {
        self.http.clear_token()
    }

    // =========================================================================
    // Users (super admin)
    // =========================================================================

    /// All accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn users(&self) -> Result<Vec<User>> {
        self.http
            .send(Method::GET, "/api/admin/users", None::<&()>)
            .await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a malformed
    /// email or blank name.
    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        Email::parse(&user.email)
            .map_err(|e| ClientError::Validation(format!("Email is invalid: {e}")))?;
        if user.full_name.trim().is_empty() {
            return Err(ClientError::Validation("Full name is required".to_string()));
        }
        self.http
            .send(Method::POST, "/api/admin/users", Some(user))
            .await
    }

    /// One account.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn user(&self, id: UserId) -> Result<User> {
        self.http
            .send(Method::GET, &format!("/api/admin/users/{id}"), None::<&()>)
            .await
    }

    /// Edit an account; absent fields stay unchanged.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User> {
        self.http
            .send(Method::PUT, &format!("/api/admin/users/{id}"), Some(update))
            .await
    }

    /// Deactivate an account (reversible; accounts are never hard-deleted).
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn deactivate_user(&self, id: UserId) -> Result<()> {
        self.http
            .send_unit(Method::DELETE, &format!("/api/admin/users/{id}"), None::<&()>)
            .await
    }

    /// Reactivate a deactivated account.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn activate_user(&self, id: UserId) -> Result<User> {
        self.http
            .send(
                Method::POST,
                &format!("/api/admin/users/{id}/activate"),
                None::<&()>,
            )
            .await
    }

    // =========================================================================
    // Access requests
    // =========================================================================

    /// The review queue, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn access_requests(
        &self,
        status: Option<AccessRequestStatus>,
    ) -> Result<Vec<AccessRequest>> {
        let path = status.map_or_else(
            || "/api/admin/access-requests".to_string(),
            |s| format!("/api/admin/access-requests?status={s}"),
        );
        self.http.send(Method::GET, &path, None::<&()>).await
    }

    /// One request.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn access_request(&self, id: AccessRequestId) -> Result<AccessRequest> {
        self.http
            .send(
                Method::GET,
                &format!("/api/admin/access-requests/{id}"),
                None::<&()>,
            )
            .await
    }

    /// Review a request: status, notes, expiry.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn review_access_request(
        &self,
        id: AccessRequestId,
        review: &AccessRequestReview,
    ) -> Result<AccessRequest> {
        self.http
            .send(
                Method::PUT,
                &format!("/api/admin/access-requests/{id}"),
                Some(review),
            )
            .await
    }

    // =========================================================================
    // Permission levels
    // =========================================================================

    /// All levels.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn permission_levels(&self) -> Result<Vec<PermissionLevel>> {
        self.http
            .send(Method::GET, "/api/permissions/levels", None::<&()>)
            .await
    }

    /// Create a level.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) when `name` or
    /// `description` is blank.
    pub async fn create_permission_level(
        &self,
        form: &PermissionLevelForm,
    ) -> Result<PermissionLevel> {
        validate_level(form)?;
        self.http
            .send(Method::POST, "/api/permissions/levels", Some(form))
            .await
    }

    /// Replace a level's fields.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) when `name` or
    /// `description` is blank.
    pub async fn update_permission_level(
        &self,
        id: PermissionLevelId,
        form: &PermissionLevelForm,
    ) -> Result<PermissionLevel> {
        validate_level(form)?;
        self.http
            .send(Method::PUT, &format!("/api/permissions/levels/{id}"), Some(form))
            .await
    }

    /// Destroy a level. Refused server-side while users reference it.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn delete_permission_level(&self, id: PermissionLevelId) -> Result<()> {
        self.http
            .send_unit(
                Method::DELETE,
                &format!("/api/permissions/levels/{id}"),
                None::<&()>,
            )
            .await
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Folder listing, optionally scoped to a parent.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn categories(
        &self,
        parent_id: Option<ridgeline_core::CategoryId>,
    ) -> Result<Vec<DocumentCategory>> {
        let path = parent_id.map_or_else(
            || "/api/documents/categories".to_string(),
            |id| format!("/api/documents/categories?parent_id={id}"),
        );
        self.http.send(Method::GET, &path, None::<&()>).await
    }

    /// Create a folder.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a blank name.
    pub async fn create_category(&self, form: &CategoryForm) -> Result<DocumentCategory> {
        if form.name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".to_string()));
        }
        self.http
            .send(Method::POST, "/api/documents/categories", Some(form))
            .await
    }

    /// Upload a document as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a blank title
    /// or empty file.
    pub async fn upload_document(&self, upload: DocumentUpload) -> Result<Document> {
        if upload.title.trim().is_empty() {
            return Err(ClientError::Validation("Title is required".to_string()));
        }
        if upload.bytes.is_empty() {
            return Err(ClientError::Validation("File is empty".to_string()));
        }

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| ClientError::Validation(format!("Invalid content type: {e}")))?;
        let mut form = multipart::Form::new()
            .text("title", upload.title)
            .text("category_id", upload.category_id.to_string())
            .text("tags", upload.tags.join(","))
            .part("file", part);
        if let Some(description) = upload.description {
            form = form.text("description", description);
        }

        let builder = self
            .http
            .request(Method::POST, "/api/documents")?
            .multipart(form);
        self.http.send_builder(builder).await
    }

    /// Destroy a document. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn delete_document(&self, id: DocumentId) -> Result<()> {
        self.http
            .send_unit(Method::DELETE, &format!("/api/documents/{id}"), None::<&()>)
            .await
    }

    /// Per-document audit trail, newest first.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn document_access_logs(&self, id: DocumentId) -> Result<Vec<AccessLogEntry>> {
        self.http
            .send(
                Method::GET,
                &format!("/api/documents/{id}/access-logs"),
                None::<&()>,
            )
            .await
    }

    /// Recent activity across all documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn activity_logs(&self, limit: Option<usize>) -> Result<Vec<AccessLogEntry>> {
        let path = limit.map_or_else(
            || "/api/admin/activity-logs".to_string(),
            |n| format!("/api/admin/activity-logs?limit={n}"),
        );
        self.http.send(Method::GET, &path, None::<&()>).await
    }

    // =========================================================================
    // Q&A
    // =========================================================================

    /// All threads (admins see everything).
    ///
    /// # Errors
    ///
    /// Returns the typed error on any non-2xx answer.
    pub async fn qa_threads(&self) -> Result<Vec<QaThread>> {
        self.http
            .send(Method::GET, "/api/qa/threads", None::<&()>)
            .await
    }

    /// Answer a thread, or re-edit an existing answer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` (no request sent) for a blank
    /// answer.
    pub async fn answer_question(&self, id: QaThreadId, answer: &str) -> Result<QaThread> {
        if answer.trim().is_empty() {
            return Err(ClientError::Validation("Answer is required".to_string()));
        }
        self.http
            .send(
                Method::PUT,
                &format!("/api/qa/threads/{id}/answer"),
                Some(&serde_json::json!({"answer": answer})),
            )
            .await
    }
}

fn validate_level(form: &PermissionLevelForm) -> Result<()> {
    if form.name.trim().is_empty() {
        return Err(ClientError::Validation("Name is required".to_string()));
    }
    if form.description.trim().is_empty() {
        return Err(ClientError::Validation("Description is required".to_string()));
    }
    Ok(())
}
