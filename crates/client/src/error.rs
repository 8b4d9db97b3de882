//! The SDK's single error type.
//!
//! Every failure a caller can see is a `ClientError`. API failures carry the
//! backend's `detail` message, the HTTP status and the parsed response body;
//! network-level failures report status 0, the conventional stand-in for
//! "the request never got an HTTP answer".

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by [`crate::PortalClient`] and [`crate::AdminClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// The backend's `detail` string, or `HTTP <status>` when absent.
        message: String,
        /// HTTP status code of the response.
        status: u16,
        /// Parsed JSON response body, when there was one.
        details: Option<Value>,
    },

    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response carried a body the SDK could not decode.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The input failed a client-side check; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The token store could not be read or written.
    #[error("token store error: {0}")]
    TokenStore(String),
}

impl ClientError {
    /// Build an API error from a status code and optional JSON body,
    /// preferring the backend's `detail` field for the message.
    #[must_use]
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("detail"))
            .and_then(Value::as_str)
            .map_or_else(|| format!("HTTP {status}"), str::to_owned);
        Self::Api {
            message,
            status,
            details: body,
        }
    }

    /// The HTTP status behind this error; 0 when no response was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::Network(_) | Self::Decode(_) | Self::Validation(_) | Self::TokenStore(_) => 0,
        }
    }

    /// Whether this is the 401 that should reset a session to anonymous.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_field_is_preferred() {
        let err = ClientError::from_response(409, Some(json!({"detail": "already accepted"})));
        assert_eq!(err.to_string(), "already accepted");
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn test_missing_detail_falls_back_to_status() {
        let err = ClientError::from_response(502, Some(json!({"error": "bad gateway"})));
        assert_eq!(err.to_string(), "HTTP 502");

        let err = ClientError::from_response(404, None);
        assert_eq!(err.to_string(), "HTTP 404");
    }

    #[test]
    fn test_network_errors_report_status_zero() {
        assert_eq!(ClientError::Network("refused".to_string()).status(), 0);
        assert_eq!(ClientError::Validation("bad".to_string()).status(), 0);
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(ClientError::from_response(401, None).is_unauthorized());
        assert!(!ClientError::from_response(403, None).is_unauthorized());
        assert!(!ClientError::Network("refused".to_string()).is_unauthorized());
    }
}
