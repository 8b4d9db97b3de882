//! The auth/NDA gating state machine.
//!
//! The portal gates investor content twice: a bearer token gets you past the
//! login gate, and an NDA acceptance for the current version gets you past
//! the NDA gate. Rather than scattering boolean flags, the whole flow is one
//! tagged union with a single exhaustive transition function; both the SDK's
//! session layer and the portal's tests drive this type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::nda::NdaStatus;
use crate::types::user::User;

/// Observable authentication state of a portal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    /// No token, or the token was cleared after a logout/401.
    Anonymous,
    /// Holding a valid token, but the current NDA version is unaccepted.
    PendingNda { user: User },
    /// Holding a valid token with the current NDA version accepted.
    Active {
        user: User,
        accepted_at: DateTime<Utc>,
        version: String,
    },
}

/// Everything that can move a session between [`AuthState`]s.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// OTP verification succeeded and the current user + NDA status were
    /// fetched with the fresh token.
    SignedIn { user: User, nda: NdaStatus },
    /// The NDA-accept call succeeded and the status cache was refreshed.
    NdaAccepted { nda: NdaStatus },
    /// Explicit logout.
    SignedOut,
    /// Any request came back 401; the token is gone.
    TokenRejected,
}

/// How much a route demands of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Login, NDA text, access-request submission.
    Public,
    /// Requires a token: `/nda`, profile.
    Authenticated,
    /// Requires a token and a current-version NDA acceptance: documents, Q&A.
    NdaGated,
}

/// Redirect target produced when a session fails a route's gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Send the visitor to the login screen.
    Login,
    /// Send the visitor to the NDA acceptance screen.
    Nda,
}

impl Gate {
    /// The route the UI redirects to for this gate.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Nda => "/nda",
        }
    }
}

impl AuthState {
    /// Apply one event. Exhaustive over every (state, event) pair.
    #[must_use]
    pub fn apply(self, event: AuthEvent) -> Self {
        match (self, event) {
            // Logout and token rejection always land in Anonymous.
            (_, AuthEvent::SignedOut | AuthEvent::TokenRejected) => Self::Anonymous,

            // A fresh sign-in replaces whatever was there before.
            (_, AuthEvent::SignedIn { user, nda }) => Self::classify(user, &nda),

            // Accepting the NDA only means something once signed in.
            (Self::Anonymous, AuthEvent::NdaAccepted { .. }) => Self::Anonymous,
            (
                Self::PendingNda { user } | Self::Active { user, .. },
                AuthEvent::NdaAccepted { nda },
            ) => Self::classify(user, &nda),
        }
    }

    /// Classify a signed-in user by their NDA status.
    fn classify(user: User, nda: &NdaStatus) -> Self {
        match (nda.accepted, nda.accepted_at, nda.version.clone()) {
            (true, Some(accepted_at), Some(version)) => Self::Active {
                user,
                accepted_at,
                version,
            },
            // An accepted flag without its details is treated as pending so
            // the user re-signs rather than slipping past the gate.
            _ => Self::PendingNda { user },
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::PendingNda { user } | Self::Active { user, .. } => Some(user),
        }
    }

    /// Whether a token is held (regardless of NDA progress).
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Check this session against a route's requirements.
    ///
    /// `None` means pass; `Some(gate)` names the redirect target.
    #[must_use]
    pub const fn gate(&self, route: RouteClass) -> Option<Gate> {
        match route {
            RouteClass::Public => None,
            RouteClass::Authenticated => match self {
                Self::Anonymous => Some(Gate::Login),
                Self::PendingNda { .. } | Self::Active { .. } => None,
            },
            RouteClass::NdaGated => match self {
                Self::Anonymous => Some(Gate::Login),
                Self::PendingNda { .. } => Some(Gate::Nda),
                Self::Active { .. } => None,
            },
        }
    }
}
