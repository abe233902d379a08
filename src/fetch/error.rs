//! Error types for imagery queries.

use thiserror::Error;

/// Generic user-facing text when the backend gives no usable message.
const GENERIC_FAILURE: &str = "Request failed";

/// Errors that can occur while querying imagery for a location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Location text was empty or whitespace only
    #[error("Location must not be empty")]
    InvalidInput,

    /// Transport error or non-2xx response from the backend
    #[error("Backend request failed: {message}")]
    BackendFailure {
        /// HTTP status, absent for transport errors
        status: Option<u16>,
        /// Message reported by the backend or transport
        message: String,
        /// Extra diagnostics from the error payload
        detail: Option<String>,
    },

    /// Response body was not the expected structure
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl QueryError {
    /// Create a transport-level failure (no HTTP status).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::BackendFailure {
            status: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// The single string shown to the user for any fetch failure.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::InvalidInput => String::new(),
            QueryError::BackendFailure { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            QueryError::BackendFailure { .. } | QueryError::MalformedResponse(_) => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = QueryError::BackendFailure {
            status: Some(500),
            message: "GEE timeout".to_string(),
            detail: Some("export stalled".to_string()),
        };
        assert_eq!(err.user_message(), "GEE timeout");
    }

    #[test]
    fn test_malformed_and_blank_failures_share_generic_text() {
        assert_eq!(QueryError::malformed("eof").user_message(), "Request failed");
        assert_eq!(QueryError::transport("  ").user_message(), "Request failed");
    }

    #[test]
    fn test_display_keeps_diagnostics() {
        let err = QueryError::malformed("missing field `png`");
        assert_eq!(err.to_string(), "Malformed response: missing field `png`");
    }
}
