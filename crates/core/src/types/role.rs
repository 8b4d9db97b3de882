//! User roles.

use serde::{Deserialize, Serialize};

/// Role attached to every portal account.
///
/// Investors are plain `user`s; the admin console is available to `admin`
/// and `super_admin`, and user management is reserved for `super_admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Investor account: OTP login, document/Q&A access behind the NDA gate.
    #[default]
    User,
    /// Admin console access: documents, permissions, access requests, Q&A.
    Admin,
    /// Admin plus user management (create/edit/deactivate/activate).
    SuperAdmin,
}

impl UserRole {
    /// Whether this role can use the admin console at all.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Whether this role can create, edit, deactivate or activate users.
    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
