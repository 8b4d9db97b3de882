//! Authentication service errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors produced by [`super::AuthService`].
///
/// OTP failures deliberately collapse into one message so callers cannot
/// distinguish "no such account" from "wrong code" from "expired code".
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing challenge, wrong code, or expired code.
    #[error("Invalid or expired verification code")]
    InvalidOtp,

    /// The challenge burned through its attempt budget.
    #[error("Too many failed attempts; request a new code")]
    TooManyAttempts,

    /// Unknown email, wrong password, or non-admin account on a password login.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account is deactivated or past its access expiry.
    #[error("Account is deactivated")]
    AccountDisabled,

    /// New password fails the minimum-length policy.
    #[error("Password must be at least 8 characters")]
    WeakPassword,

    /// Password hashing/parsing failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
