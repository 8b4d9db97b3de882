//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures internal errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always `{"detail": "..."}`,
//! which is the shape the SDK's error classifier expects.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request body failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => Self::NotFound(entity.to_string()),
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::Poisoned => Self::Internal(err.to_string()),
        }
    }
}

/// Wire shape for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidOtp | AuthError::TooManyAttempts => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AccountDisabled => StatusCode::FORBIDDEN,
                AuthError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
                AuthError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
                AuthError::Store(StoreError::Poisoned) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `detail` string sent to the client. Internal details stay inside.
    fn detail(&self) -> String {
        match self {
            Self::Internal(_)
            | Self::Auth(AuthError::Hash(_) | AuthError::Store(StoreError::Poisoned)) => {
                "Internal server error".to_string()
            }
            Self::Auth(err) => err.to_string(),
            Self::NotFound(entity) => format!("{entity} not found"),
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Validation(message)
            | Self::Conflict(message) => message.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            detail: self.detail(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
