//! Error types for the Cellswap client

use std::fmt;

/// Errors surfaced by [`crate::ApiClient`] and everything built on it.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, body decode).
    Http(reqwest::Error),
    /// Request body could not be serialized.
    Encode(serde_json::Error),
    /// Non-success HTTP status other than the handled 401 path. The message
    /// comes from the backend's `{"error": ...}` body when present.
    Status { status: u16, message: String },
    /// The session is gone: the 401/refresh path bottomed out and both
    /// tokens were cleared. Terminal — the caller must re-authenticate.
    SessionExpired,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP error: {}", e),
            ApiError::Encode(e) => write!(f, "request encoding error: {}", e),
            ApiError::Status { status, message } => {
                write!(f, "API error {}: {}", status, message)
            }
            ApiError::SessionExpired => write!(f, "session expired"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Encode(e)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 422,
            message: "quote expired".to_string(),
        };
        assert_eq!(format!("{}", err), "API error 422: quote expired");
    }

    #[test]
    fn test_session_expired_display() {
        assert_eq!(format!("{}", ApiError::SessionExpired), "session expired");
    }
}
