//! End-to-end tests for Ridgeline.
//!
//! Each test boots the portal in-process on an ephemeral loopback port and
//! drives it through the real SDK - actual HTTP, actual serialization, no
//! mocked transport. The in-memory store doubles as the test's backdoor for
//! things a black-box client cannot see (the emailed OTP code).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ridgeline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `investor_flow` - OTP login, NDA gating, session state machine
//! - `admin_flow` - admin registration, role gating, user management
//! - `document_flow` - upload, filtered listing, download logging, deletion
//! - `qa_and_requests` - access requests, permission levels, Q&A

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use ridgeline_client::{AdminClient, MemoryTokenStore, PortalClient, Session};
use ridgeline_core::{Email, OtpPurpose};
use ridgeline_portal::config::PortalConfig;
use ridgeline_portal::routes;
use ridgeline_portal::state::AppState;

/// An in-process portal bound to an ephemeral loopback port.
///
/// The server task is aborted when the harness is dropped.
pub struct TestPortal {
    base_url: String,
    state: AppState,
    server: tokio::task::JoinHandle<()>,
}

impl TestPortal {
    /// Boot a fresh portal with an empty store and no SMTP (demo mode).
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{addr}");

        let config = PortalConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config).expect("app state");

        let app = routes::app(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            base_url,
            state,
            server,
        }
    }

    /// The portal's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Direct store access for seeding and assertions the API hides.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// A fresh investor client with its own in-memory token store.
    #[must_use]
    pub fn portal_client(&self) -> PortalClient {
        PortalClient::new(&self.base_url, Arc::new(MemoryTokenStore::new()))
            .expect("portal client")
    }

    /// A fresh investor session (anonymous).
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.portal_client())
    }

    /// A fresh admin client with its own in-memory token store.
    #[must_use]
    pub fn admin_client(&self) -> AdminClient {
        AdminClient::new(&self.base_url, Arc::new(MemoryTokenStore::new()))
            .expect("admin client")
    }

    /// The live OTP code for an email, read straight from the store (the
    /// test's stand-in for reading the email).
    #[must_use]
    pub fn issued_code(&self, email: &str) -> Option<String> {
        let email = Email::parse(email).expect("valid email");
        self.state
            .store()
            .otp(&(email, OtpPurpose::Login))
            .expect("store read")
            .map(|challenge| challenge.code)
    }

    /// Seed an active investor account directly in the store.
    pub fn seed_investor(&self, email: &str, full_name: &str) -> ridgeline_core::User {
        use chrono::Utc;
        use ridgeline_core::{User, UserId, UserRole};
        use ridgeline_portal::store::UserRecord;

        let now = Utc::now();
        self.state
            .store()
            .insert_user(UserRecord {
                user: User {
                    id: UserId::generate(),
                    email: Email::parse(email).expect("valid email"),
                    full_name: full_name.to_string(),
                    role: UserRole::User,
                    permission_level_id: None,
                    is_active: true,
                    expires_at: None,
                    created_at: now,
                    updated_at: now,
                },
                password_hash: None,
            })
            .expect("seed investor")
    }

    /// Run the full OTP login for a seeded investor and return the session.
    pub async fn signed_in_session(&self, email: &str) -> Session {
        let mut session = self.session();
        session.request_code(email).await.expect("request code");
        let code = self.issued_code(email).expect("code issued");
        session.sign_in(email, &code).await.expect("sign in");
        session
    }
}

impl Drop for TestPortal {
    fn drop(&mut self) {
        self.server.abort();
    }
}
