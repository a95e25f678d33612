/// Error types for the remote data client
///
/// The taxonomy mirrors what the UI needs to distinguish: transport
/// failures, decode failures, a missing resource, and server-reported
/// failures carrying a message. User-facing text always prefers the
/// server-supplied message over a generic fallback.

use thiserror::Error;

/// Client result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Remote data client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Resource does not exist (404)
    #[error("resource not found")]
    NotFound {
        /// Server-supplied message, if the error body had one
        message: Option<String>,
    },

    /// Server rejected the request with a non-success status
    #[error("server returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,

        /// Server-supplied message, if the error body had one
        message: Option<String>,
    },
}

impl ApiError {
    /// Returns the message to show the user, preferring server-supplied
    /// text over the given fallback
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::NotFound { message: Some(m) }
            | ApiError::Status {
                message: Some(m), ..
            } => m.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether this error means the resource is absent rather than broken
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Status {
            status: 422,
            message: Some("Title already taken".to_string()),
        };
        assert_eq!(err.user_message("Failed to create task."), "Title already taken");
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("Failed to create task."), "Failed to create task.");

        let err = ApiError::Decode(serde_json::from_str::<i64>("x").unwrap_err());
        assert_eq!(err.user_message("Failed to load tasks."), "Failed to load tasks.");
    }

    #[test]
    fn test_is_not_found() {
        assert!(ApiError::NotFound { message: None }.is_not_found());
        assert!(!ApiError::Status {
            status: 500,
            message: None
        }
        .is_not_found());
    }
}
