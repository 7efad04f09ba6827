//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur when making HTTP requests.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// The request never produced a response (DNS, refused, reset...).
    #[error("Failed to fetch: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP error! status: {status}")]
    HttpError { status: u16, message: String },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl FetchError {
    /// Whether the failure happened below HTTP (no response was received).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server answered with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::ParseError(e.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            FetchError::HttpError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else if e.is_decode() {
            FetchError::ParseError(e.to_string())
        } else {
            FetchError::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_connectivity_classification() {
        assert!(FetchError::Connection("refused".into()).is_connectivity());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_connectivity());
        assert!(!FetchError::ParseError("bad".into()).is_connectivity());
    }

    #[test]
    fn test_server_error_classification() {
        let err = FetchError::HttpError {
            status: 503,
            message: String::new(),
        };
        assert!(err.is_server_error());
        assert_eq!(err.status(), Some(503));

        let err = FetchError::HttpError {
            status: 404,
            message: String::new(),
        };
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_http_error_message_carries_status() {
        let err = FetchError::HttpError {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }
}
