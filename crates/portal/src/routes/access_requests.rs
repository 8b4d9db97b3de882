//! Access request route handlers.
//!
//! Submission is the one public write in the whole API: prospective
//! investors ask for data room access from the marketing site. Review is
//! admin surface; status transitions are deliberately unconstrained.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use ridgeline_core::{AccessRequest, AccessRequestId, AccessRequestStatus, Email};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /api/access-requests`.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub email: String,
    pub full_name: String,
    pub company: String,
    pub message: Option<String>,
}

/// Query parameters for `GET /api/admin/access-requests`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<AccessRequestStatus>,
}

/// Request body for `PUT /api/admin/access-requests/{id}`.
///
/// Only the fields present are changed; the submission itself is immutable.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub status: Option<AccessRequestStatus>,
    pub admin_notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Public submission.
///
/// POST /api/access-requests
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<SubmitForm>,
) -> Result<Json<AccessRequest>> {
    let email = Email::parse(&form.email)
        .map_err(|e| AppError::Validation(format!("Email is invalid: {e}")))?;
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }
    let company = form.company.trim();
    if company.is_empty() {
        return Err(AppError::Validation("Company is required".to_string()));
    }

    let now = Utc::now();
    let request = state.store().insert_access_request(AccessRequest {
        id: AccessRequestId::generate(),
        email,
        full_name: full_name.to_string(),
        company: company.to_string(),
        message: form.message.filter(|m| !m.trim().is_empty()),
        status: AccessRequestStatus::Pending,
        admin_notes: None,
        expires_at: None,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(request_id = %request.id, company = %request.company, "access request submitted");
    Ok(Json(request))
}

/// Review queue, newest first, optionally filtered by status.
///
/// GET /api/admin/access-requests[?status]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AccessRequest>>> {
    Ok(Json(state.store().list_access_requests(query.status)?))
}

/// One request.
///
/// GET /api/admin/access-requests/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AccessRequestId>,
) -> Result<Json<AccessRequest>> {
    Ok(Json(state.store().access_request(id)?))
}

/// Review a request: set status, notes, expiry.
///
/// PUT /api/admin/access-requests/{id}
#[instrument(skip(state, form), fields(admin_id = %admin.id, request_id = %id))]
pub async fn review(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<AccessRequestId>,
    Json(form): Json<ReviewForm>,
) -> Result<Json<AccessRequest>> {
    let mut request = state.store().access_request(id)?;
    if let Some(status) = form.status {
        request.status = status;
    }
    if let Some(notes) = form.admin_notes {
        request.admin_notes = Some(notes).filter(|n| !n.trim().is_empty());
    }
    if form.expires_at.is_some() {
        request.expires_at = form.expires_at;
    }
    request.updated_at = Utc::now();

    let request = state.store().update_access_request(request)?;
    tracing::info!(status = %request.status, "access request reviewed");
    Ok(Json(request))
}
