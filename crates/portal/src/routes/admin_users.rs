//! User management route handlers.
//!
//! Reserved for `super_admin`, enforced here rather than trusted to any
//! client. DELETE is deactivation: accounts are never hard-deleted and a
//! deactivated user's tokens stop resolving on the next request.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use ridgeline_core::{Email, PermissionLevelId, User, UserId, UserRole};

use crate::error::{AppError, Result};
use crate::middleware::RequireSuperAdmin;
use crate::state::AppState;
use crate::store::UserRecord;

/// Request body for `POST /api/admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
    pub permission_level_id: Option<PermissionLevelId>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/admin/users/{id}`.
///
/// Absent fields are left unchanged. `permission_level_id` and `expires_at`
/// use a double option so `null` clears while absence preserves.
#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "double_option")]
    pub permission_level_id: Option<Option<PermissionLevelId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Distinguish an absent field (leave unchanged) from an explicit `null`
/// (clear the value).
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// All accounts, oldest first.
///
/// GET /api/admin/users
pub async fn list(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.store().list_users()?))
}

/// Create an investor or admin account.
///
/// POST /api/admin/users
#[instrument(skip(state, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Json(form): Json<CreateUserForm>,
) -> Result<Json<User>> {
    let email = Email::parse(&form.email)
        .map_err(|e| AppError::Validation(format!("Email is invalid: {e}")))?;
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }
    if let Some(level_id) = form.permission_level_id {
        // Fail up front so the account never references a dangling level.
        state.store().level(level_id)?;
    }

    let now = Utc::now();
    let user = state.store().insert_user(UserRecord {
        user: User {
            id: UserId::generate(),
            email,
            full_name: full_name.to_string(),
            role: form.role,
            permission_level_id: form.permission_level_id,
            is_active: true,
            expires_at: form.expires_at,
            created_at: now,
            updated_at: now,
        },
        password_hash: None,
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "user created");
    Ok(Json(user))
}

/// One account.
///
/// GET /api/admin/users/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    Ok(Json(state.store().user(id)?.user))
}

/// Edit an account.
///
/// PUT /api/admin/users/{id}
#[instrument(skip(state, form), fields(admin_id = %admin.id, user_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(id): Path<UserId>,
    Json(form): Json<UpdateUserForm>,
) -> Result<Json<User>> {
    let mut user = state.store().user(id)?.user;

    if let Some(full_name) = form.full_name {
        let full_name = full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        user.full_name = full_name;
    }
    if let Some(role) = form.role {
        user.role = role;
    }
    if let Some(level) = form.permission_level_id {
        if let Some(level_id) = level {
            state.store().level(level_id)?;
        }
        user.permission_level_id = level;
    }
    if let Some(expires_at) = form.expires_at {
        user.expires_at = expires_at;
    }
    user.updated_at = Utc::now();

    let user = state.store().update_user(user)?;
    tracing::info!("user updated");
    Ok(Json(user))
}

/// Deactivate an account (the DELETE semantics for users).
///
/// DELETE /api/admin/users/{id}
#[instrument(skip(state), fields(admin_id = %admin.id, user_id = %id))]
pub async fn deactivate(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if admin.id == id {
        return Err(AppError::Conflict(
            "You cannot deactivate your own account".to_string(),
        ));
    }
    set_active(&state, id, false)?;
    tracing::info!("user deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// Reactivate a deactivated account.
///
/// POST /api/admin/users/{id}/activate
#[instrument(skip(state), fields(admin_id = %admin.id, user_id = %id))]
pub async fn activate(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = set_active(&state, id, true)?;
    tracing::info!("user reactivated");
    Ok(Json(user))
}

fn set_active(state: &AppState, id: UserId, active: bool) -> Result<User> {
    let mut user = state.store().user(id)?.user;
    user.is_active = active;
    user.updated_at = Utc::now();
    Ok(state.store().update_user(user)?)
}
