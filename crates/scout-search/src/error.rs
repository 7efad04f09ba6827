//! Search error types.

use scout_cache::CacheError;
use scout_data::FetchError;
use thiserror::Error;

/// Errors surfaced by the search core.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// The request was superseded. Never shown to the user.
    #[error("Request cancelled")]
    Cancelled,

    /// No response was received (connectivity, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a 5xx status.
    #[error("Server error: HTTP {status}")]
    Server { status: u16, message: String },

    /// Anything else: 4xx, malformed body, unexpected failures.
    #[error("Search failed: {0}")]
    Generic(String),

    /// Persisted client-local data could not be read back.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client-local storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The search session task has stopped.
    #[error("Search session closed")]
    Closed,
}

/// Coarse error classification used for display and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Cancelled,
    Network,
    Server,
    Generic,
    Parse,
}

impl ErrorKind {
    /// Human-readable message for a failed search.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network => {
                "Unable to connect to the server. Please check your internet connection and try again."
            }
            Self::Server => "Server error occurred. Please try again later.",
            Self::Cancelled | Self::Generic | Self::Parse => "Search failed. Please try again.",
        }
    }
}

impl SearchError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::Generic(_) | Self::Storage(_) | Self::Closed => ErrorKind::Generic,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Whether this is a silent cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<FetchError> for SearchError {
    fn from(e: FetchError) -> Self {
        if e.is_connectivity() {
            SearchError::Network(e.to_string())
        } else if e.is_server_error() {
            SearchError::Server {
                status: e.status().unwrap_or(500),
                message: e.to_string(),
            }
        } else {
            SearchError::Generic(e.to_string())
        }
    }
}

impl From<CacheError> for SearchError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::SerializeError(e) => SearchError::Parse(e.to_string()),
            other => SearchError::Storage(other.to_string()),
        }
    }
}

/// A failure as presented to the user: classification plus message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SearchFailure {
    /// Classification.
    pub kind: ErrorKind,
    /// Message suitable for display next to a retry affordance.
    pub message: String,
    /// Underlying error text, for logs.
    pub detail: String,
}

impl SearchFailure {
    /// Build a failure from an error. Returns `None` for cancellations.
    pub fn from_error(error: &SearchError) -> Option<Self> {
        if error.is_cancelled() {
            return None;
        }
        let kind = error.kind();
        Some(Self {
            kind,
            message: kind.user_message().to_string(),
            detail: error.to_string(),
        })
    }
}
