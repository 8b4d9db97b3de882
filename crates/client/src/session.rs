//! Investor session: the auth/NDA state machine bound to live calls.
//!
//! [`Session`] owns a [`PortalClient`] and an explicit
//! [`AuthState`](ridgeline_core::AuthState); every flow (sign-in, NDA
//! acceptance, logout) is one transition through
//! [`AuthState::apply`](ridgeline_core::AuthState::apply). A 401 from any
//! call drops the session back to `Anonymous` - the transport has already
//! cleared the stored token by the time the error surfaces here.

use ridgeline_core::{AuthEvent, AuthState, Gate, OtpPurpose, RouteClass};

use crate::error::{ClientError, Result};
use crate::portal::PortalClient;
use crate::types::OtpRequested;

/// A stateful investor session over the portal API.
#[derive(Debug)]
pub struct Session {
    client: PortalClient,
    state: AuthState,
}

impl Session {
    /// Start an anonymous session over `client`.
    #[must_use]
    pub const fn new(client: PortalClient) -> Self {
        Self {
            client,
            state: AuthState::Anonymous,
        }
    }

    /// The underlying client, for calls that do not move the state machine.
    #[must_use]
    pub const fn client(&self) -> &PortalClient {
        &self.client
    }

    /// Current authentication state.
    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// Check the session against a route's requirements.
    ///
    /// `None` means pass; `Some(gate)` names the redirect target
    /// (`/login` or `/nda`).
    #[must_use]
    pub const fn gate(&self, route: RouteClass) -> Option<Gate> {
        self.state.gate(route)
    }

    /// Rebuild state from a persisted token, if one is stored.
    ///
    /// With no token this is a no-op (still anonymous, no network). A stale
    /// token resolves to `Anonymous` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns non-401 errors (network down, server failure) unchanged.
    pub async fn resume(&mut self) -> Result<&AuthState> {
        if !self.client.is_authenticated()? {
            self.state = AuthState::Anonymous;
            return Ok(&self.state);
        }

        match self.fetch_signed_in().await {
            Ok(event) => {
                self.state = std::mem::replace(&mut self.state, AuthState::Anonymous).apply(event);
                Ok(&self.state)
            }
            Err(err) if err.is_unauthorized() => {
                self.state = AuthState::Anonymous;
                Ok(&self.state)
            }
            Err(err) => Err(err),
        }
    }

    /// Request (or resend) a one-time login code.
    ///
    /// Resending simply re-runs the request; the backend replaces any live
    /// challenge.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a malformed address.
    pub async fn request_code(&self, email: &str) -> Result<OtpRequested> {
        self.client.request_otp(email).await
    }

    /// Complete the OTP login: verify the code, then load the user and NDA
    /// status with the fresh token.
    ///
    /// # Errors
    ///
    /// A failed verification leaves the state unchanged and surfaces the
    /// backend's message for the retry prompt.
    pub async fn sign_in(&mut self, email: &str, code: &str) -> Result<&AuthState> {
        self.client
            .verify_otp(email, code, OtpPurpose::Login)
            .await?;
        let event = self.fetch_signed_in().await.map_err(|e| self.note(e))?;
        self.state = std::mem::replace(&mut self.state, AuthState::Anonymous).apply(event);
        Ok(&self.state)
    }

    /// Accept the current NDA version and refresh the status cache.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when unconfirmed or unsigned;
    /// backend failures (including the 409 for a re-accept) are surfaced
    /// after the state is reconciled.
    pub async fn accept_nda(
        &mut self,
        digital_signature: &str,
        confirmed: bool,
    ) -> Result<&AuthState> {
        self.client
            .accept_nda(digital_signature, confirmed)
            .await
            .map_err(|e| self.note(e))?;
        let nda = self.client.nda_status().await.map_err(|e| self.note(e))?;
        self.state = std::mem::replace(&mut self.state, AuthState::Anonymous)
            .apply(AuthEvent::NdaAccepted { nda });
        Ok(&self.state)
    }

    /// Explicit logout. The session is anonymous afterward even if the
    /// backend call failed; the token is gone locally either way.
    ///
    /// # Errors
    ///
    /// Returns the backend error, if any, after the local state is reset.
    pub async fn sign_out(&mut self) -> Result<()> {
        let result = if self.client.is_authenticated()? {
            self.client.logout().await
        } else {
            Ok(())
        };
        self.state = std::mem::replace(&mut self.state, AuthState::Anonymous)
            .apply(AuthEvent::SignedOut);
        result
    }

    /// Load the signed-in event payload (user + NDA status).
    async fn fetch_signed_in(&self) -> Result<AuthEvent> {
        let user = self.client.me().await?;
        let nda = self.client.nda_status().await?;
        Ok(AuthEvent::SignedIn { user, nda })
    }

    /// Reconcile state with an error before passing it on: a 401 means the
    /// token is gone, so the session is anonymous.
    fn note(&mut self, err: ClientError) -> ClientError {
        if err.is_unauthorized() {
            self.state = std::mem::replace(&mut self.state, AuthState::Anonymous)
                .apply(AuthEvent::TokenRejected);
        }
        err
    }
}
