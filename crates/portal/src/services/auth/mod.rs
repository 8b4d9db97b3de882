//! Authentication service.
//!
//! Two front doors share one session registry: investors sign in with an
//! emailed one-time code, admins with a password. Both yield an opaque
//! bearer token that maps to exactly one user until logout or expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::{Rng, RngCore};

use ridgeline_core::{Email, OtpPurpose, User, UserId, UserRole};

use crate::store::{MemoryStore, OtpChallenge, SessionRecord, UserRecord};

use super::Mailer;

/// How long an OTP challenge stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Failed attempts before a challenge is invalidated.
const OTP_MAX_ATTEMPTS: u8 = 5;

/// Session lifetime.
const SESSION_TTL_HOURS: i64 = 24;

/// Minimum admin password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service over the shared store and mail channel.
pub struct AuthService<'a> {
    store: &'a MemoryStore,
    mailer: &'a Mailer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore, mailer: &'a Mailer) -> Self {
        Self { store, mailer }
    }

    // =========================================================================
    // OTP flow (investors)
    // =========================================================================

    /// Issue and deliver a one-time code, replacing any live challenge for
    /// this email+purpose.
    ///
    /// Callers MUST report success whether or not a code was actually issued:
    /// this method silently does nothing for unknown or unusable accounts so
    /// the endpoint never leaks which emails exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` on store failure. Mail delivery failures
    /// are logged and swallowed, again to keep the response uniform.
    pub async fn request_otp(&self, email: &Email, purpose: OtpPurpose) -> Result<(), AuthError> {
        let Some(record) = self.store.user_by_email(email)? else {
            tracing::debug!(email = %email, "OTP requested for unknown email");
            return Ok(());
        };
        if !record.user.is_usable(Utc::now()) {
            tracing::debug!(email = %email, "OTP requested for unusable account");
            return Ok(());
        }

        let code = generate_code();
        self.store.set_otp(
            (email.clone(), purpose),
            OtpChallenge {
                code: code.clone(),
                expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
                attempts: 0,
            },
        )?;

        if let Err(err) = self.mailer.send_otp(email, &code, OTP_TTL_MINUTES).await {
            tracing::error!(email = %email, error = %err, "failed to deliver OTP email");
        }
        Ok(())
    }

    /// Verify a submitted code and open a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` for a missing/expired/wrong code,
    /// `AuthError::TooManyAttempts` once the attempt budget is exhausted, and
    /// `AuthError::AccountDisabled` if the account became unusable since the
    /// code was issued.
    pub fn verify_otp(
        &self,
        email: &Email,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(User, SessionRecord), AuthError> {
        let key = (email.clone(), purpose);
        let Some(challenge) = self.store.otp(&key)? else {
            return Err(AuthError::InvalidOtp);
        };

        if Utc::now() >= challenge.expires_at {
            self.store.remove_otp(&key)?;
            return Err(AuthError::InvalidOtp);
        }

        if challenge.code != code {
            let attempts = self.store.bump_otp_attempts(&key)?;
            if attempts >= OTP_MAX_ATTEMPTS {
                self.store.remove_otp(&key)?;
                return Err(AuthError::TooManyAttempts);
            }
            return Err(AuthError::InvalidOtp);
        }

        // Single-use: burn the challenge before handing out a token.
        self.store.remove_otp(&key)?;

        let record = self
            .store
            .user_by_email(email)?
            .ok_or(AuthError::InvalidOtp)?;
        if !record.user.is_usable(Utc::now()) {
            return Err(AuthError::AccountDisabled);
        }

        let session = self.open_session(record.user.id)?;
        tracing::info!(user_id = %record.user.id, "OTP login");
        Ok((record.user, session))
    }

    // =========================================================================
    // Password flow (admins)
    // =========================================================================

    /// Register an admin account and open a session.
    ///
    /// The first admin registered on an empty store becomes `super_admin`;
    /// every later registration becomes `admin`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` for a short password, or a store
    /// conflict if the email is already registered.
    pub fn register_admin(
        &self,
        email: Email,
        password: &str,
        full_name: String,
    ) -> Result<(User, SessionRecord), AuthError> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        let role = if self.store.admin_count()? == 0 {
            UserRole::SuperAdmin
        } else {
            UserRole::Admin
        };

        let now = Utc::now();
        let user = self.store.insert_user(UserRecord {
            user: User {
                id: UserId::generate(),
                email,
                full_name,
                role,
                permission_level_id: None,
                is_active: true,
                expires_at: None,
                created_at: now,
                updated_at: now,
            },
            password_hash: Some(hash_password(password)?),
        })?;

        let session = self.open_session(user.id)?;
        tracing::info!(user_id = %user.id, role = %user.role, "admin registered");
        Ok((user, session))
    }

    /// Password login for admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for unknown emails, wrong
    /// passwords, or non-admin accounts; `AuthError::AccountDisabled` for
    /// deactivated accounts.
    pub fn login_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(User, SessionRecord), AuthError> {
        let record = self
            .store
            .user_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = record
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !record.user.role.is_admin() || !verify_password(hash, password) {
            return Err(AuthError::InvalidCredentials);
        }
        if !record.user.is_usable(Utc::now()) {
            return Err(AuthError::AccountDisabled);
        }

        let session = self.open_session(record.user.id)?;
        tracing::info!(user_id = %record.user.id, "admin login");
        Ok((record.user, session))
    }

    /// Change a password after re-verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong, `AuthError::WeakPassword` for a short replacement.
    pub fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let record = self.store.user(user_id)?;
        let hash = record
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(hash, current) {
            return Err(AuthError::InvalidCredentials);
        }
        if new.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        self.store.set_password_hash(user_id, hash_password(new)?)?;
        Ok(())
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Destroy the session behind a bearer token, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` on store failure.
    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.remove_session(token)?;
        Ok(())
    }

    fn open_session(&self, user_id: UserId) -> Result<SessionRecord, AuthError> {
        let now = Utc::now();
        let session = SessionRecord {
            token: generate_token(),
            user_id,
            created_at: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        };
        self.store.insert_session(session.clone())?;
        Ok(session)
    }
}

/// A fresh 6-digit numeric code, zero-padded.
fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

/// A fresh opaque bearer token (256 bits, URL-safe base64).
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored hash. Unparseable hashes fail closed.
fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    fn investor(store: &MemoryStore, email: &str) -> User {
        let now = Utc::now();
        store
            .insert_user(UserRecord {
                user: User {
                    id: UserId::generate(),
                    email: Email::parse(email).unwrap(),
                    full_name: "Investor".to_string(),
                    role: UserRole::User,
                    permission_level_id: None,
                    is_active: true,
                    expires_at: None,
                    created_at: now,
                    updated_at: now,
                },
                password_hash: None,
            })
            .unwrap()
    }

    fn issued_code(store: &MemoryStore, email: &str) -> String {
        store
            .otp(&(Email::parse(email).unwrap(), OtpPurpose::Login))
            .unwrap()
            .unwrap()
            .code
    }

    #[tokio::test]
    async fn test_otp_roundtrip() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        let user = investor(&store, "lp@fund.com");
        let email = Email::parse("lp@fund.com").unwrap();

        service.request_otp(&email, OtpPurpose::Login).await.unwrap();
        let code = issued_code(&store, "lp@fund.com");

        let (verified, session) = service.verify_otp(&email, &code, OtpPurpose::Login).unwrap();
        assert_eq!(verified.id, user.id);
        assert_eq!(store.session(&session.token).unwrap().unwrap().user_id, user.id);

        // Single-use: the same code does not verify twice.
        assert!(matches!(
            service.verify_otp(&email, &code, OtpPurpose::Login),
            Err(AuthError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn test_unknown_email_issues_nothing_but_succeeds() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        let email = Email::parse("stranger@nowhere.com").unwrap();

        service.request_otp(&email, OtpPurpose::Login).await.unwrap();
        assert!(store.otp(&(email, OtpPurpose::Login)).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_code_exhausts_attempts() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        investor(&store, "lp@fund.com");
        let email = Email::parse("lp@fund.com").unwrap();

        service.request_otp(&email, OtpPurpose::Login).await.unwrap();
        let code = issued_code(&store, "lp@fund.com");
        let wrong = if code == "000000" { "000001" } else { "000000" };

        for _ in 0..4 {
            assert!(matches!(
                service.verify_otp(&email, wrong, OtpPurpose::Login),
                Err(AuthError::InvalidOtp)
            ));
        }
        assert!(matches!(
            service.verify_otp(&email, wrong, OtpPurpose::Login),
            Err(AuthError::TooManyAttempts)
        ));
        // Challenge is gone; even the right code fails now.
        assert!(matches!(
            service.verify_otp(&email, &code, OtpPurpose::Login),
            Err(AuthError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn test_resend_replaces_challenge() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        investor(&store, "lp@fund.com");
        let email = Email::parse("lp@fund.com").unwrap();

        service.request_otp(&email, OtpPurpose::Login).await.unwrap();
        let first = issued_code(&store, "lp@fund.com");
        service.request_otp(&email, OtpPurpose::Login).await.unwrap();
        let second = issued_code(&store, "lp@fund.com");

        if first != second {
            assert!(matches!(
                service.verify_otp(&email, &first, OtpPurpose::Login),
                Err(AuthError::InvalidOtp)
            ));
        }
        assert!(service.verify_otp(&email, &second, OtpPurpose::Login).is_ok());
    }

    #[test]
    fn test_first_admin_is_super_admin() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);

        let (first, _) = service
            .register_admin(
                Email::parse("first@fund.com").unwrap(),
                "correct-horse",
                "First Admin".to_string(),
            )
            .unwrap();
        assert_eq!(first.role, UserRole::SuperAdmin);

        let (second, _) = service
            .register_admin(
                Email::parse("second@fund.com").unwrap(),
                "correct-horse",
                "Second Admin".to_string(),
            )
            .unwrap();
        assert_eq!(second.role, UserRole::Admin);
    }

    #[test]
    fn test_register_rejects_short_password() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        assert!(matches!(
            service.register_admin(
                Email::parse("a@fund.com").unwrap(),
                "short",
                "A".to_string()
            ),
            Err(AuthError::WeakPassword)
        ));
    }

    #[test]
    fn test_register_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        let email = Email::parse("a@fund.com").unwrap();
        service
            .register_admin(email.clone(), "correct-horse", "A".to_string())
            .unwrap();
        assert!(matches!(
            service.register_admin(email, "correct-horse", "A".to_string()),
            Err(AuthError::Store(StoreError::Conflict(_)))
        ));
    }

    #[test]
    fn test_password_login_and_change() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        let email = Email::parse("admin@fund.com").unwrap();
        let (user, _) = service
            .register_admin(email.clone(), "correct-horse", "Admin".to_string())
            .unwrap();

        assert!(service.login_with_password(&email, "correct-horse").is_ok());
        assert!(matches!(
            service.login_with_password(&email, "wrong-horse"),
            Err(AuthError::InvalidCredentials)
        ));

        service
            .change_password(user.id, "correct-horse", "battery-staple")
            .unwrap();
        assert!(service.login_with_password(&email, "battery-staple").is_ok());
        assert!(matches!(
            service.login_with_password(&email, "correct-horse"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_otp_login_rejected_for_investor_password_login() {
        // Investors have no password hash; password login must not work.
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        investor(&store, "lp@fund.com");
        assert!(matches!(
            service.login_with_password(&Email::parse("lp@fund.com").unwrap(), "anything"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_logout_destroys_session() {
        let store = MemoryStore::new();
        let mailer = Mailer::Log;
        let service = AuthService::new(&store, &mailer);
        let (_, session) = service
            .register_admin(
                Email::parse("admin@fund.com").unwrap(),
                "correct-horse",
                "Admin".to_string(),
            )
            .unwrap();

        service.logout(&session.token).unwrap();
        assert!(store.session(&session.token).unwrap().is_none());
    }
}
