//! Investor authentication route handlers (OTP flow).

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ridgeline_core::{Email, OtpPurpose, User};

use crate::error::{AppError, Result};
use crate::middleware::{BearerToken, RequireUser};
use crate::services::AuthService;
use crate::services::auth::OTP_TTL_MINUTES;
use crate::state::AppState;

/// Request body for `POST /api/auth/request-otp`.
#[derive(Debug, Deserialize)]
pub struct RequestOtpForm {
    pub email: String,
}

/// Response for `POST /api/auth/request-otp`.
///
/// Always the same envelope, whether or not the email is registered.
#[derive(Debug, Serialize)]
pub struct RequestOtpResponse {
    pub message: String,
    pub expires_in_minutes: i64,
}

/// Request body for `POST /api/auth/verify-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub email: String,
    pub otp_code: String,
    #[serde(default)]
    pub purpose: OtpPurpose,
}

/// Response for `POST /api/auth/verify-otp`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Generic message envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Issue a one-time login code.
///
/// POST /api/auth/request-otp
///
/// Reports success regardless of whether the email is recognized, so the
/// endpoint cannot be used to probe for accounts.
#[instrument(skip(state, form))]
pub async fn request_otp(
    State(state): State<AppState>,
    Json(form): Json<RequestOtpForm>,
) -> Result<Json<RequestOtpResponse>> {
    if form.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    // A malformed address cannot belong to an account; answer exactly like
    // an unknown one.
    if let Ok(email) = Email::parse(&form.email) {
        AuthService::new(state.store(), state.mailer())
            .request_otp(&email, OtpPurpose::Login)
            .await?;
    }

    Ok(Json(RequestOtpResponse {
        message: "If the email is registered, a verification code has been sent.".to_string(),
        expires_in_minutes: OTP_TTL_MINUTES,
    }))
}

/// Exchange a one-time code for a bearer token.
///
/// POST /api/auth/verify-otp
#[instrument(skip(state, form))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(form): Json<VerifyOtpForm>,
) -> Result<Json<TokenResponse>> {
    let code = form.otp_code.trim();
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Verification code must be 6 digits".to_string(),
        ));
    }

    let email =
        Email::parse(&form.email).map_err(|_| crate::services::auth::AuthError::InvalidOtp)?;

    let (_, session) =
        AuthService::new(state.store(), state.mailer()).verify_otp(&email, code, form.purpose)?;

    Ok(Json(TokenResponse {
        access_token: session.token,
        token_type: "bearer".to_string(),
    }))
}

/// Current user record.
///
/// GET /api/auth/me
pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// Destroy the caller's session.
///
/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<MessageResponse>> {
    AuthService::new(state.store(), state.mailer()).logout(&token)?;
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use ridgeline_core::{Email, OtpPurpose, UserRole};

    use crate::routes::testing::{app, seed_user, send, state};

    #[tokio::test]
    async fn test_unknown_email_gets_the_same_envelope_and_no_challenge() {
        let state = state();

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/auth/request-otp",
            None,
            Some(json!({"email": "stranger@nowhere.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expires_in_minutes"], 10);
        assert!(
            state
                .store()
                .otp(&(Email::parse("stranger@nowhere.com").unwrap(), OtpPurpose::Login))
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_otp_login_roundtrip() {
        let state = state();
        seed_user(&state, "lp@fund.com", UserRole::User);

        let (status, _) = send(
            app(&state),
            "POST",
            "/api/auth/request-otp",
            None,
            Some(json!({"email": "lp@fund.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let code = state
            .store()
            .otp(&(Email::parse("lp@fund.com").unwrap(), OtpPurpose::Login))
            .unwrap()
            .unwrap()
            .code;

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/auth/verify-otp",
            None,
            Some(json!({"email": "lp@fund.com", "otp_code": code})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");

        let token = body["access_token"].as_str().unwrap().to_string();
        let (status, body) = send(app(&state), "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "lp@fund.com");
    }

    #[tokio::test]
    async fn test_wrong_code_surfaces_detail() {
        let state = state();
        seed_user(&state, "lp@fund.com", UserRole::User);

        send(
            app(&state),
            "POST",
            "/api/auth/request-otp",
            None,
            Some(json!({"email": "lp@fund.com"})),
        )
        .await;

        let code = state
            .store()
            .otp(&(Email::parse("lp@fund.com").unwrap(), OtpPurpose::Login))
            .unwrap()
            .unwrap()
            .code;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/auth/verify-otp",
            None,
            Some(json!({"email": "lp@fund.com", "otp_code": wrong})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid or expired verification code");
    }

    #[tokio::test]
    async fn test_malformed_code_is_rejected_with_422() {
        let state = state();
        let (status, body) = send(
            app(&state),
            "POST",
            "/api/auth/verify-otp",
            None,
            Some(json!({"email": "lp@fund.com", "otp_code": "12ab56"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Verification code must be 6 digits");
    }

    #[tokio::test]
    async fn test_me_without_token_is_401() {
        let state = state();
        let (status, body) = send(app(&state), "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_logout_destroys_the_session() {
        let state = state();
        let (_, token) = seed_user(&state, "lp@fund.com", UserRole::User);

        let (status, _) = send(app(&state), "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(app(&state), "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deactivated_user_token_stops_resolving() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);

        let mut updated = user;
        updated.is_active = false;
        state.store().update_user(updated).unwrap();

        let (status, _) = send(app(&state), "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
