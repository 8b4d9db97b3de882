//! Permission level route handlers.
//!
//! Levels are named capability bundles referenced by users. Deletion is
//! destructive, so it is refused while any user still points at the level.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ridgeline_core::{PermissionLevel, PermissionLevelId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::state::AppState;

/// Request body for `POST /api/permissions/levels` and
/// `PUT /api/permissions/levels/{id}`.
#[derive(Debug, Deserialize)]
pub struct LevelForm {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_download: bool,
    #[serde(default)]
    pub has_expiry: bool,
    pub max_downloads: Option<u32>,
}

impl LevelForm {
    fn validated(&self) -> Result<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }
        Ok((name.to_string(), description.to_string()))
    }
}

/// All levels, by name.
///
/// GET /api/permissions/levels
///
/// Readable by any signed-in user (the investor UI shows the caller their
/// own capability bundle); mutation is admin surface.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
) -> Result<Json<Vec<PermissionLevel>>> {
    Ok(Json(state.store().list_levels()?))
}

/// Create a level.
///
/// POST /api/permissions/levels
#[instrument(skip(state, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<LevelForm>,
) -> Result<Json<PermissionLevel>> {
    let (name, description) = form.validated()?;
    let now = Utc::now();
    let level = state.store().insert_level(PermissionLevel {
        id: PermissionLevelId::generate(),
        name,
        description,
        can_view: form.can_view,
        can_download: form.can_download,
        has_expiry: form.has_expiry,
        max_downloads: form.max_downloads,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(level_id = %level.id, name = %level.name, "permission level created");
    Ok(Json(level))
}

/// One level.
///
/// GET /api/permissions/levels/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<PermissionLevelId>,
) -> Result<Json<PermissionLevel>> {
    Ok(Json(state.store().level(id)?))
}

/// Replace a level's fields.
///
/// PUT /api/permissions/levels/{id}
#[instrument(skip(state, form), fields(admin_id = %admin.id, level_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<PermissionLevelId>,
    Json(form): Json<LevelForm>,
) -> Result<Json<PermissionLevel>> {
    let (name, description) = form.validated()?;
    let existing = state.store().level(id)?;
    let level = state.store().update_level(PermissionLevel {
        id,
        name,
        description,
        can_view: form.can_view,
        can_download: form.can_download,
        has_expiry: form.has_expiry,
        max_downloads: form.max_downloads,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    })?;

    tracing::info!("permission level updated");
    Ok(Json(level))
}

/// Destroy a level.
///
/// DELETE /api/permissions/levels/{id}
#[instrument(skip(state), fields(admin_id = %admin.id, level_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<PermissionLevelId>,
) -> Result<StatusCode> {
    state.store().delete_level(id)?;
    tracing::info!("permission level deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use ridgeline_core::UserRole;

    use crate::routes::testing::{app, seed_user, send, state};

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let state = state();
        let (_, token) = seed_user(&state, "admin@fund.com", UserRole::Admin);

        let (status, created) = send(
            app(&state),
            "POST",
            "/api/permissions/levels",
            Some(&token),
            Some(json!({
                "name": "View Only",
                "description": "Read the room, download nothing",
                "can_view": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["can_view"], true);
        assert_eq!(created["can_download"], false);

        let id = created["id"].as_str().unwrap().to_string();
        let path = format!("/api/permissions/levels/{id}");

        let (status, updated) = send(
            app(&state),
            "PUT",
            &path,
            Some(&token),
            Some(json!({
                "name": "View & Download",
                "description": "Full read access",
                "can_view": true,
                "can_download": true,
                "max_downloads": 25
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "View & Download");
        assert_eq!(updated["max_downloads"], 25);

        let (status, _) = send(app(&state), "DELETE", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(app(&state), "GET", &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_name_or_description_is_422() {
        let state = state();
        let (_, token) = seed_user(&state, "admin@fund.com", UserRole::Admin);

        for (payload, detail) in [
            (json!({"name": " ", "description": "d"}), "Name is required"),
            (json!({"name": "n", "description": ""}), "Description is required"),
        ] {
            let (status, body) = send(
                app(&state),
                "POST",
                "/api/permissions/levels",
                Some(&token),
                Some(payload),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["detail"], detail);
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_a_conflict() {
        let state = state();
        let (_, token) = seed_user(&state, "admin@fund.com", UserRole::Admin);
        let payload = json!({"name": "Standard", "description": "d", "can_view": true});

        let (status, _) = send(
            app(&state),
            "POST",
            "/api/permissions/levels",
            Some(&token),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/permissions/levels",
            Some(&token),
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["detail"].as_str().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn test_investors_may_list_but_not_mutate() {
        let state = state();
        let (_, investor_token) = seed_user(&state, "lp@fund.com", UserRole::User);

        let (status, _) = send(
            app(&state),
            "GET",
            "/api/permissions/levels",
            Some(&investor_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            app(&state),
            "POST",
            "/api/permissions/levels",
            Some(&investor_token),
            Some(json!({"name": "n", "description": "d"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
