//! Admin authentication route handlers (password flow).
//!
//! Admins hold a separate session from the investor surface; the SDK keeps
//! the two tokens under distinct storage keys. Registration is open, but the
//! role granted is decided server-side: the first admin on an empty store
//! becomes `super_admin`, everyone after that `admin`.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ridgeline_core::{Email, User};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::auth::{MessageResponse, TokenResponse};
use crate::services::AuthService;
use crate::state::AppState;

/// Request body for `POST /api/admin-auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Request body for `POST /api/admin-auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /api/admin-auth/me`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileForm {
    pub full_name: String,
}

/// Request body for `POST /api/admin-auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
}

/// Register an admin account.
///
/// POST /api/admin-auth/register
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Json<TokenResponse>> {
    let email = Email::parse(&form.email)
        .map_err(|e| AppError::Validation(format!("Email is invalid: {e}")))?;
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }

    let (_, session) = AuthService::new(state.store(), state.mailer()).register_admin(
        email,
        &form.password,
        full_name.to_string(),
    )?;

    Ok(Json(TokenResponse {
        access_token: session.token,
        token_type: "bearer".to_string(),
    }))
}

/// Password login.
///
/// POST /api/admin-auth/login
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<TokenResponse>> {
    let email = Email::parse(&form.email)
        .map_err(|_| crate::services::auth::AuthError::InvalidCredentials)?;
    let (_, session) =
        AuthService::new(state.store(), state.mailer()).login_with_password(&email, &form.password)?;

    Ok(Json(TokenResponse {
        access_token: session.token,
        token_type: "bearer".to_string(),
    }))
}

/// Own profile.
///
/// GET /api/admin-auth/me
pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<User> {
    Json(admin)
}

/// Update own profile.
///
/// PUT /api/admin-auth/me
#[instrument(skip(state, form), fields(admin_id = %admin.id))]
pub async fn update_me(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<UpdateProfileForm>,
) -> Result<Json<User>> {
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".to_string()));
    }

    let mut user = admin;
    user.full_name = full_name.to_string();
    user.updated_at = Utc::now();
    Ok(Json(state.store().update_user(user)?))
}

/// Rotate the password after re-verifying the current one.
///
/// POST /api/admin-auth/change-password
#[instrument(skip(state, form), fields(admin_id = %admin.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<ChangePasswordForm>,
) -> Result<Json<MessageResponse>> {
    AuthService::new(state.store(), state.mailer()).change_password(
        admin.id,
        &form.current_password,
        &form.new_password,
    )?;
    tracing::info!("password changed");
    Ok(Json(MessageResponse {
        message: "Password changed".to_string(),
    }))
}
