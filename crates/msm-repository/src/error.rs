//! Error types for repository access
//!
//! Every failure carries a human-readable reason that ends up verbatim in
//! the notification shown to the operator.

use msm_collection::ParentId;

/// Result alias for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Remote collection store failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Backend answered with a non-success status
    #[error("backend returned {status}: {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason extracted from the response body or status line
        reason: String,
    },

    /// Request never produced a response (connect failure, timeout, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Client misconfiguration
    #[error("configuration error: {0}")]
    Config(String),

    /// Parent does not exist in the store
    #[error("unknown parent: {0}")]
    UnknownParent(ParentId),
}

impl RepositoryError {
    /// Reason string suitable for an operator-facing message
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Status { reason, .. } => reason.clone(),
            Self::Transport(reason) | Self::Decode(reason) | Self::Config(reason) => {
                reason.clone()
            }
            Self::UnknownParent(id) => format!("{id} not found"),
        }
    }

    /// Check if repeating the same request could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Decode(_) | Self::Config(_) | Self::UnknownParent(_) => false,
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else if err.is_timeout() {
            Self::Transport("request timed out".to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
