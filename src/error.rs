//! Client error type.
//!
//! There is one failure category: a request or response failed. The variants
//! only record where the failure came from so a custom error handler can
//! inspect it; the client itself never branches on them.

use thiserror::Error;

/// A request or response failure.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Failure reported by the reqwest transport (connect, timeout, body read).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Network failure reported by a non-reqwest transport.
    #[error("Network error: {0}")]
    Network(String),

    /// Request body could not be serialized, or the response body could not
    /// be parsed into the requested type.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// HTTP status code, if the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure was a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Request(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = HttpError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_non_status_errors_have_no_status() {
        assert_eq!(HttpError::Network("reset".into()).status(), None);
        assert_eq!(HttpError::InvalidUrl("".into()).status(), None);
    }

    #[test]
    fn test_serde_error_converts() {
        let serde_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: HttpError = serde_err.into();
        assert!(matches!(err, HttpError::Serde(_)));
    }
}
