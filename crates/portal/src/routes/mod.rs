//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness (warm-up ping target)
//!
//! # Investor auth (rate limited)
//! POST /api/auth/request-otp                    - Issue a one-time code
//! POST /api/auth/verify-otp                     - Exchange code for a bearer token
//! GET  /api/auth/me                             - Current user
//! POST /api/auth/logout                         - Destroy the session
//!
//! # NDA
//! GET  /api/nda/content                         - Current NDA text (public)
//! POST /api/nda/accept                          - Record acceptance
//! GET  /api/nda/status                          - Acceptance status
//!
//! # Data room (NDA-gated)
//! GET  /api/documents/categories[?parent_id]    - Folder listing
//! GET  /api/documents/category/{id}/documents   - Documents in a folder
//! GET  /api/documents/{id}                      - Document metadata
//! GET  /api/documents/{id}/download             - File download (logged)
//! GET  /api/documents/{id}/view                 - Inline view (logged)
//! GET  /api/documents/{id}/url                  - Short-lived direct link
//!
//! # Document administration
//! POST /api/documents                           - Upload (multipart)
//! DELETE /api/documents/{id}                    - Destroy
//! POST /api/documents/categories                - Create folder
//! GET  /api/documents/{id}/access-logs          - Per-document audit trail
//! GET  /api/admin/activity-logs                 - Recent activity across documents
//!
//! # Access requests
//! POST /api/access-requests                     - Public submission
//! GET  /api/admin/access-requests[?status]      - Review queue
//! GET/PUT /api/admin/access-requests/{id}       - Review one request
//!
//! # Admin auth
//! POST /api/admin-auth/register|login           - Password auth
//! GET/PUT /api/admin-auth/me                    - Own profile
//! POST /api/admin-auth/change-password          - Rotate password
//!
//! # User management (super admin)
//! GET/POST /api/admin/users                     - List / create
//! GET/PUT/DELETE /api/admin/users/{id}          - Fetch / edit / deactivate
//! POST /api/admin/users/{id}/activate           - Reactivate
//!
//! # Permission levels
//! GET/POST /api/permissions/levels              - List / create
//! GET/PUT/DELETE /api/permissions/levels/{id}   - Fetch / edit / destroy
//!
//! # Q&A
//! POST /api/qa/questions                        - Ask (NDA-gated)
//! GET  /api/qa/threads                          - Own + public (admins: all)
//! PUT  /api/qa/threads/{id}/answer              - Answer/re-edit (admin)
//! GET  /api/qa/search?q=                        - Search visible threads
//! ```

pub mod access_requests;
pub mod admin_auth;
pub mod admin_users;
pub mod auth;
pub mod documents;
pub mod nda;
pub mod permissions;
pub mod qa;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the investor auth routes router (rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/request-otp", post(auth::request_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the NDA routes router.
pub fn nda_routes() -> Router<AppState> {
    Router::new()
        .route("/content", get(nda::content))
        .route("/accept", post(nda::accept))
        .route("/status", get(nda::status))
}

/// Create the document routes router.
pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(documents::list_categories).post(documents::create_category),
        )
        .route(
            "/category/{id}/documents",
            get(documents::documents_in_category),
        )
        .route("/", post(documents::upload))
        .route(
            "/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/{id}/download", get(documents::download))
        .route("/{id}/view", get(documents::view))
        .route("/{id}/url", get(documents::direct_url))
        .route("/{id}/access-logs", get(documents::access_logs))
}

/// Create the admin auth routes router.
pub fn admin_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(admin_auth::register))
        .route("/login", post(admin_auth::login))
        .route("/me", get(admin_auth::me).put(admin_auth::update_me))
        .route("/change-password", post(admin_auth::change_password))
}

/// Create the admin console routes router (users, reviews, activity).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(admin_users::list).post(admin_users::create),
        )
        .route(
            "/users/{id}",
            get(admin_users::get)
                .put(admin_users::update)
                .delete(admin_users::deactivate),
        )
        .route("/users/{id}/activate", post(admin_users::activate))
        .route("/access-requests", get(access_requests::list))
        .route(
            "/access-requests/{id}",
            get(access_requests::get).put(access_requests::review),
        )
        .route("/activity-logs", get(documents::activity_logs))
}

/// Create the permission level routes router.
pub fn permission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/levels",
            get(permissions::list).post(permissions::create),
        )
        .route(
            "/levels/{id}",
            get(permissions::get)
                .put(permissions::update)
                .delete(permissions::delete),
        )
}

/// Create the Q&A routes router.
pub fn qa_routes() -> Router<AppState> {
    Router::new()
        .route("/questions", post(qa::submit_question))
        .route("/threads", get(qa::list_threads))
        .route("/threads/{id}/answer", put(qa::answer))
        .route("/search", get(qa::search))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/nda", nda_routes())
        .nest("/api/documents", document_routes())
        .route("/api/access-requests", post(access_requests::submit))
        .nest("/api/admin-auth", admin_auth_routes())
        .nest("/api/admin", admin_routes())
        .nest("/api/permissions", permission_routes())
        .nest("/api/qa", qa_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. This is the target of the SDK's
/// best-effort warm-up ping.
async fn health() -> &'static str {
    "ok"
}

/// Assemble the full application router for the given state.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! Shared scaffolding for handler tests: an in-memory portal, seed
    //! helpers that write straight to the store, and a tiny oneshot client.

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use ridgeline_core::{
        AcceptanceId, CategoryId, Document, DocumentCategory, DocumentId, Email, NdaAcceptance,
        User, UserId, UserRole,
    };

    use crate::config::PortalConfig;
    use crate::state::AppState;
    use crate::store::{DocumentRecord, SessionRecord, UserRecord};

    pub fn state() -> AppState {
        let config = PortalConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://portal.test".to_string(),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::new(config).unwrap()
    }

    pub fn app(state: &AppState) -> Router {
        super::app(state.clone())
    }

    /// Insert a user with the given role and open a session for them.
    pub fn seed_user(state: &AppState, email: &str, role: UserRole) -> (User, String) {
        let now = Utc::now();
        let user = state
            .store()
            .insert_user(UserRecord {
                user: User {
                    id: UserId::generate(),
                    email: Email::parse(email).unwrap(),
                    full_name: "Seeded User".to_string(),
                    role,
                    permission_level_id: None,
                    is_active: true,
                    expires_at: None,
                    created_at: now,
                    updated_at: now,
                },
                password_hash: None,
            })
            .unwrap();
        let token = format!("test-token-{}", user.id);
        state
            .store()
            .insert_session(SessionRecord {
                token: token.clone(),
                user_id: user.id,
                created_at: now,
                expires_at: now + Duration::hours(1),
            })
            .unwrap();
        (user, token)
    }

    /// Record a current-version NDA acceptance for a user.
    pub fn accept_nda(state: &AppState, user: &User) {
        let nda = state.store().nda().unwrap();
        state
            .store()
            .insert_acceptance(NdaAcceptance {
                id: AcceptanceId::generate(),
                user_id: user.id,
                nda_id: nda.nda_id,
                version: nda.version,
                digital_signature: user.full_name.clone(),
                ip_address: "unknown".to_string(),
                user_agent: "tests".to_string(),
                accepted_at: Utc::now(),
            })
            .unwrap();
    }

    pub fn seed_category(state: &AppState, name: &str) -> DocumentCategory {
        state
            .store()
            .insert_category(DocumentCategory {
                id: CategoryId::generate(),
                name: name.to_string(),
                parent_id: None,
                sort_order: 0,
            })
            .unwrap()
    }

    pub fn seed_document(
        state: &AppState,
        category: &DocumentCategory,
        title: &str,
        bytes: &[u8],
    ) -> Document {
        let uploader = UserId::generate();
        state
            .store()
            .insert_document(DocumentRecord {
                document: Document {
                    id: DocumentId::generate(),
                    title: title.to_string(),
                    description: None,
                    category_id: category.id,
                    tags: vec!["seeded".to_string()],
                    file_name: "file.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    size_bytes: bytes.len() as u64,
                    uploaded_by: uploader,
                    created_at: Utc::now(),
                },
                bytes: bytes.to_vec(),
            })
            .unwrap()
    }

    /// Fire one request and decode the JSON response (if any).
    pub async fn send(
        app: Router,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
