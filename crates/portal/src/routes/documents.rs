//! Data room document route handlers.
//!
//! Investor reads sit behind the NDA gate and are additionally filtered by
//! the caller's permission level; every successful view/download is appended
//! to the access log. Uploads, deletion and the audit endpoints are admin
//! surface.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ridgeline_core::{
    AccessLogEntry, AccessLogId, CategoryId, Document, DocumentAction, DocumentCategory,
    DocumentId, User,
};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireNda};
use crate::state::AppState;
use crate::store::DocumentRecord;

/// How long the advertised direct link stays valid.
const DIRECT_URL_TTL_SECONDS: u64 = 300;

/// Query parameters for `GET /api/documents/categories`.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub parent_id: Option<CategoryId>,
}

/// Query parameters for `GET /api/documents/category/{id}/documents`.
#[derive(Debug, Deserialize)]
pub struct DocumentFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
}

/// Request body for `POST /api/documents/categories`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryForm {
    pub name: String,
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Response for `GET /api/documents/{id}/url`.
#[derive(Debug, Serialize)]
pub struct DirectUrlResponse {
    pub url: String,
    pub expires_in_seconds: u64,
}

/// Query parameters for `GET /api/admin/activity-logs`.
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

/// Folder listing, optionally scoped to a parent.
///
/// GET /api/documents/categories[?parent_id]
pub async fn list_categories(
    State(state): State<AppState>,
    RequireNda(_user): RequireNda,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<DocumentCategory>>> {
    Ok(Json(state.store().list_categories(query.parent_id)?))
}

/// Create a folder.
///
/// POST /api/documents/categories
#[instrument(skip(state, form), fields(admin_id = %admin.id))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<CreateCategoryForm>,
) -> Result<Json<DocumentCategory>> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let category = state.store().insert_category(DocumentCategory {
        id: CategoryId::generate(),
        name: name.to_string(),
        parent_id: form.parent_id,
        sort_order: form.sort_order,
    })?;

    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    Ok(Json(category))
}

/// Documents in a folder, filtered by search text and tag.
///
/// GET /api/documents/category/{id}/documents[?search,&tag]
pub async fn documents_in_category(
    State(state): State<AppState>,
    RequireNda(_user): RequireNda,
    Path(id): Path<CategoryId>,
    Query(filter): Query<DocumentFilter>,
) -> Result<Json<Vec<Document>>> {
    // 404 for a bogus folder rather than an empty listing.
    state.store().category(id)?;

    let documents = state
        .store()
        .documents_in_category(id)?
        .into_iter()
        .filter(|d| {
            filter
                .search
                .as_deref()
                .is_none_or(|needle| d.matches_search(needle))
        })
        .filter(|d| {
            filter
                .tag
                .as_deref()
                .is_none_or(|tag| d.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
        })
        .collect();
    Ok(Json(documents))
}

/// Upload a document.
///
/// POST /api/documents (multipart/form-data)
///
/// Expected parts: `title`, `category_id`, `file` (with filename and content
/// type), optional `description` and `tags` (comma-separated).
#[instrument(skip(state, multipart), fields(admin_id = %admin.id))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<Document>> {
    let mut title = None;
    let mut description = None;
    let mut category_id = None;
    let mut tags = Vec::new();
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "title" => title = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "category_id" => {
                let raw = read_text(field).await?;
                category_id = Some(raw.parse::<CategoryId>().map_err(|_| {
                    AppError::Validation("category_id must be a UUID".to_string())
                })?);
            }
            "tags" => {
                tags = read_text(field)
                    .await?
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            "file" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let title = title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Title is required".to_string()))?
        .to_string();
    let category_id =
        category_id.ok_or_else(|| AppError::Validation("category_id is required".to_string()))?;
    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::Validation("A file part is required".to_string()))?;

    let document = state.store().insert_document(DocumentRecord {
        document: Document {
            id: DocumentId::generate(),
            title,
            description: description.filter(|d| !d.trim().is_empty()),
            category_id,
            tags,
            file_name,
            content_type,
            size_bytes: bytes.len() as u64,
            uploaded_by: admin.id,
            created_at: Utc::now(),
        },
        bytes,
    })?;

    tracing::info!(
        document_id = %document.id,
        title = %document.title,
        size_bytes = document.size_bytes,
        "document uploaded"
    );
    Ok(Json(document))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart field: {e}")))
}

/// Document metadata.
///
/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    RequireNda(_user): RequireNda,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>> {
    Ok(Json(state.store().document(id)?))
}

/// Destroy a document. Irreversible.
///
/// DELETE /api/documents/{id}
#[instrument(skip(state), fields(admin_id = %admin.id, document_id = %id))]
pub async fn delete_document(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DocumentId>,
) -> Result<StatusCode> {
    state.store().delete_document(id)?;
    tracing::info!("document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Download the document file.
///
/// GET /api/documents/{id}/download
#[instrument(skip(state, user), fields(user_id = %user.id, document_id = %id))]
pub async fn download(
    State(state): State<AppState>,
    RequireNda(user): RequireNda,
    Path(id): Path<DocumentId>,
) -> Result<Response> {
    ensure_capability(&state, &user, DocumentAction::Download)?;
    serve_file(&state, &user, id, DocumentAction::Download)
}

/// View the document file inline.
///
/// GET /api/documents/{id}/view
#[instrument(skip(state, user), fields(user_id = %user.id, document_id = %id))]
pub async fn view(
    State(state): State<AppState>,
    RequireNda(user): RequireNda,
    Path(id): Path<DocumentId>,
) -> Result<Response> {
    ensure_capability(&state, &user, DocumentAction::View)?;
    serve_file(&state, &user, id, DocumentAction::View)
}

/// A short-lived direct link to the inline view.
///
/// GET /api/documents/{id}/url
pub async fn direct_url(
    State(state): State<AppState>,
    RequireNda(_user): RequireNda,
    Path(id): Path<DocumentId>,
) -> Result<Json<DirectUrlResponse>> {
    // Existence check so dead links are 404 here, not later.
    state.store().document(id)?;
    let base = state.config().base_url.trim_end_matches('/').to_string();
    Ok(Json(DirectUrlResponse {
        url: format!("{base}/api/documents/{id}/view"),
        expires_in_seconds: DIRECT_URL_TTL_SECONDS,
    }))
}

/// Per-document audit trail, newest first.
///
/// GET /api/documents/{id}/access-logs
pub async fn access_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DocumentId>,
) -> Result<Json<Vec<AccessLogEntry>>> {
    state.store().document(id)?;
    Ok(Json(state.store().access_logs_for(id)?))
}

/// Recent activity across all documents, newest first.
///
/// GET /api/admin/activity-logs[?limit]
pub async fn activity_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<AccessLogEntry>>> {
    Ok(Json(
        state.store().recent_access_logs(query.limit.unwrap_or(100))?,
    ))
}

/// Enforce the caller's permission level for a document action.
///
/// Accounts without an assigned level keep full read access; a level narrows
/// it. Admin accounts are never narrowed.
fn ensure_capability(state: &AppState, user: &User, action: DocumentAction) -> Result<()> {
    if user.role.is_admin() {
        return Ok(());
    }
    let Some(level_id) = user.permission_level_id else {
        return Ok(());
    };
    let level = state.store().level(level_id)?;

    match action {
        DocumentAction::View if !level.can_view => {
            Err(AppError::Forbidden("Viewing is not permitted".to_string()))
        }
        DocumentAction::Download if !level.can_download => Err(AppError::Forbidden(
            "Downloading is not permitted".to_string(),
        )),
        DocumentAction::Download => {
            if let Some(max) = level.max_downloads
                && state.store().download_count(user.id)? >= max as usize
            {
                return Err(AppError::Forbidden(
                    "Download limit reached".to_string(),
                ));
            }
            Ok(())
        }
        DocumentAction::View => Ok(()),
    }
}

/// Stream the stored bytes with the right headers and log the access.
fn serve_file(
    state: &AppState,
    user: &User,
    id: DocumentId,
    action: DocumentAction,
) -> Result<Response> {
    let (document, bytes) = state.store().document_bytes(id)?;

    state.store().append_access(AccessLogEntry {
        id: AccessLogId::generate(),
        document_id: document.id,
        user_id: user.id,
        action,
        occurred_at: Utc::now(),
    })?;

    let disposition = match action {
        DocumentAction::Download => format!("attachment; filename=\"{}\"", document.file_name),
        DocumentAction::View => format!("inline; filename=\"{}\"", document.file_name),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&document.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((headers, bytes).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;

    use ridgeline_core::{PermissionLevel, PermissionLevelId, UserRole};

    use crate::routes::testing::{
        accept_nda, app, seed_category, seed_document, seed_user, send, state,
    };

    #[tokio::test]
    async fn test_categories_are_behind_the_nda_gate() {
        let state = state();
        let (_, token) = seed_user(&state, "lp@fund.com", UserRole::User);

        let (status, body) = send(
            app(&state),
            "GET",
            "/api/documents/categories",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "NDA acceptance required");

        let (status, _) = send(app(&state), "GET", "/api/documents/categories", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_category_listing_after_acceptance() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        seed_category(&state, "Financials");

        let (status, body) = send(
            app(&state),
            "GET",
            "/api/documents/categories",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Financials");
    }

    #[tokio::test]
    async fn test_search_and_tag_filters() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        let category = seed_category(&state, "Financials");
        seed_document(&state, &category, "Q3 Statements", b"pdf");
        seed_document(&state, &category, "Cap Table", b"pdf");

        let path = format!("/api/documents/category/{}/documents?search=cap", category.id);
        let (status, body) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Cap Table");

        // Seeded documents carry the "seeded" tag.
        let path = format!("/api/documents/category/{}/documents?tag=seeded", category.id);
        let (_, body) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let path = format!("/api/documents/category/{}/documents?tag=nope", category.id);
        let (_, body) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_listing_unknown_category_is_404() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);

        let path = format!(
            "/api/documents/category/{}/documents",
            uuid::Uuid::new_v4()
        );
        let (status, _) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_is_logged() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        let category = seed_category(&state, "Financials");
        let document = seed_document(&state, &category, "Q3 Statements", b"pdf-bytes");

        let path = format!("/api/documents/{}/download", document.id);
        let (status, _) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let logs = state.store().access_logs_for(document.id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, user.id);
    }

    #[tokio::test]
    async fn test_view_only_level_cannot_download() {
        let state = state();
        let now = Utc::now();
        let level = state
            .store()
            .insert_level(PermissionLevel {
                id: PermissionLevelId::generate(),
                name: "View Only".to_string(),
                description: "No downloads".to_string(),
                can_view: true,
                can_download: false,
                has_expiry: false,
                max_downloads: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        let mut restricted = user.clone();
        restricted.permission_level_id = Some(level.id);
        state.store().update_user(restricted).unwrap();
        accept_nda(&state, &user);

        let category = seed_category(&state, "Financials");
        let document = seed_document(&state, &category, "Q3 Statements", b"pdf");

        let path = format!("/api/documents/{}/download", document.id);
        let (status, body) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Downloading is not permitted");

        let path = format!("/api/documents/{}/view", document.id);
        let (status, _) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_download_cap_is_enforced() {
        let state = state();
        let now = Utc::now();
        let level = state
            .store()
            .insert_level(PermissionLevel {
                id: PermissionLevelId::generate(),
                name: "Capped".to_string(),
                description: "One download".to_string(),
                can_view: true,
                can_download: true,
                has_expiry: false,
                max_downloads: Some(1),
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        let mut capped = user.clone();
        capped.permission_level_id = Some(level.id);
        state.store().update_user(capped).unwrap();
        accept_nda(&state, &user);

        let category = seed_category(&state, "Financials");
        let document = seed_document(&state, &category, "Q3 Statements", b"pdf");
        let path = format!("/api/documents/{}/download", document.id);

        let (status, _) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Download limit reached");
    }

    #[tokio::test]
    async fn test_delete_requires_admin_and_destroys() {
        let state = state();
        let (investor, investor_token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &investor);
        let (_, admin_token) = seed_user(&state, "admin@fund.com", UserRole::Admin);
        let category = seed_category(&state, "Financials");
        let document = seed_document(&state, &category, "Q3 Statements", b"pdf");
        let path = format!("/api/documents/{}", document.id);

        let (status, _) = send(app(&state), "DELETE", &path, Some(&investor_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(app(&state), "DELETE", &path, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(app(&state), "GET", &path, Some(&investor_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_direct_url_points_at_the_view_endpoint() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        let category = seed_category(&state, "Financials");
        let document = seed_document(&state, &category, "Q3 Statements", b"pdf");

        let path = format!("/api/documents/{}/url", document.id);
        let (status, body) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["url"],
            format!("http://portal.test/api/documents/{}/view", document.id)
        );
        assert_eq!(body["expires_in_seconds"], 300);
    }

    #[tokio::test]
    async fn test_create_category_validates_name() {
        let state = state();
        let (_, admin_token) = seed_user(&state, "admin@fund.com", UserRole::Admin);

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/documents/categories",
            Some(&admin_token),
            Some(json!({"name": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Name is required");
    }

    #[tokio::test]
    async fn test_activity_log_aggregates_across_documents() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        let (_, admin_token) = seed_user(&state, "admin@fund.com", UserRole::Admin);
        let category = seed_category(&state, "Financials");
        let a = seed_document(&state, &category, "A", b"a");
        let b = seed_document(&state, &category, "B", b"b");

        for document in [&a, &b] {
            let path = format!("/api/documents/{}/view", document.id);
            send(app(&state), "GET", &path, Some(&token), None).await;
        }

        let (status, body) = send(
            app(&state),
            "GET",
            "/api/admin/activity-logs",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(
            app(&state),
            "GET",
            "/api/admin/activity-logs?limit=1",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
