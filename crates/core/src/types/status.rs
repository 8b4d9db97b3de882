//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Review status of a prospective-investor access request.
///
/// Transitions are admin-driven and deliberately unconstrained: an admin may
/// move a request between any two statuses (e.g. re-open a denied request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessRequestStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl std::fmt::Display for AccessRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

impl std::str::FromStr for AccessRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("invalid access request status: {s}")),
        }
    }
}

/// Q&A thread lifecycle.
///
/// Intended flow is `pending` -> `answered`; the answer endpoint may re-edit
/// an existing answer, which keeps the thread in `answered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QaStatus {
    #[default]
    Pending,
    Answered,
}

/// What a user did with a document; recorded in the access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    View,
    Download,
}

/// Discriminator for OTP challenges.
///
/// Only `login` exists today; the enum keeps the wire field forward-compatible
/// with other challenge-based flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    #[default]
    Login,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_request_status_roundtrip() {
        for status in [
            AccessRequestStatus::Pending,
            AccessRequestStatus::Approved,
            AccessRequestStatus::Denied,
        ] {
            let parsed: AccessRequestStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_serde_wire_shape() {
        assert_eq!(
            serde_json::to_string(&DocumentAction::Download).unwrap(),
            "\"download\""
        );
        assert_eq!(serde_json::to_string(&OtpPurpose::Login).unwrap(), "\"login\"");
        assert_eq!(serde_json::to_string(&QaStatus::Answered).unwrap(), "\"answered\"");
    }
}
