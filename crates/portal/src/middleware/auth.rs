//! Authentication extractors.
//!
//! Provides extractors that resolve the bearer token in `Authorization` to a
//! user and enforce the portal's gates. The same ladder as the SDK-side
//! state machine, expressed as rejections instead of redirects:
//! no/stale token -> 401, missing NDA acceptance -> 403, missing role -> 403.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;

use ridgeline_core::User;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor for the raw bearer token, without resolving it.
///
/// Used by logout and password-change handlers that need the token itself.
pub struct BearerToken(pub String);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts).map(Self)
    }
}

/// Extractor that requires a valid session for an active account.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireUser(user): RequireUser) -> Json<User> {
///     Json(user)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).map(Self)
    }
}

/// Extractor that additionally requires a current-version NDA acceptance.
///
/// Admin accounts bypass the NDA gate: they manage the data room rather than
/// evaluate it, and their document access is logged the same way.
pub struct RequireNda(pub User);

impl FromRequestParts<AppState> for RequireNda {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state)?;
        ensure_nda(state, &user)?;
        Ok(Self(user))
    }
}

/// Extractor that requires an admin or super-admin session.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state)?;
        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}

/// Extractor that requires a super-admin session (user management).
pub struct RequireSuperAdmin(pub User);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state)?;
        if !user.role.can_manage_users() {
            return Err(AppError::Forbidden(
                "Super admin access required".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
}

/// Resolve the caller's token to an active user.
fn resolve_user(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let token = bearer_token(parts)?;
    let session = state
        .store()
        .session(&token)?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let record = state.store().user(session.user_id).map_err(|_| {
        // A session for a vanished user is as good as no session.
        AppError::Unauthorized("Not authenticated".to_string())
    })?;

    if !record.user.is_usable(Utc::now()) {
        // Deactivated accounts' tokens stop resolving immediately.
        state.store().remove_session(&token)?;
        return Err(AppError::Unauthorized("Not authenticated".to_string()));
    }

    Ok(record.user)
}

/// Enforce the NDA gate for non-admin users.
pub fn ensure_nda(state: &AppState, user: &User) -> Result<(), AppError> {
    if user.role.is_admin() {
        return Ok(());
    }
    let nda = state.store().nda()?;
    if state.store().acceptance(user.id, &nda.version)?.is_none() {
        return Err(AppError::Forbidden("NDA acceptance required".to_string()));
    }
    Ok(())
}
