//! Error types for the collection synchronizer
//!
//! Maps the three network failure kinds a list screen has to show:
//! - load failures (inline, replaces the list)
//! - commit failures (transient, staged items kept)
//! - remove failures (transient, confirmed items kept)

use msm_collection::{CollectionError, ItemId, ParentId};
use serde::{Deserialize, Serialize};

/// Confirmed membership could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("failed to load collection of {parent}: {reason}")]
pub struct LoadFailure {
    /// Parent whose collection was requested
    pub parent: ParentId,
    /// Reason reported by the repository
    pub reason: String,
    /// Whether a plain retry could succeed
    pub retryable: bool,
}

/// Main synchronizer error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Local transition rejected before any network call
    #[error(transparent)]
    Rejected(#[from] CollectionError),

    /// Loading confirmed membership failed
    #[error(transparent)]
    Load(#[from] LoadFailure),

    /// Bulk add rejected; staged items are intact
    #[error("commit to {parent} failed: {reason}")]
    Commit {
        /// Parent the items were committed to
        parent: ParentId,
        /// Reason reported by the repository
        reason: String,
        /// Whether a plain retry could succeed
        retryable: bool,
    },

    /// Bulk remove rejected; confirmed items are intact
    #[error("remove failed: {reason}")]
    Remove {
        /// Reason reported by the repository
        reason: String,
        /// Items that were targeted
        items: Vec<ItemId>,
        /// Whether a plain retry could succeed
        retryable: bool,
    },
}

impl SyncError {
    /// Check if the error came from the network rather than local validation
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Check if repeating the operation could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rejected(_) => false,
            Self::Load(failure) => failure.retryable,
            Self::Commit { retryable, .. } | Self::Remove { retryable, .. } => *retryable,
        }
    }

    /// Reason string reported by the backend, if any
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Rejected(_) => None,
            Self::Load(failure) => Some(&failure.reason),
            Self::Commit { reason, .. } | Self::Remove { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_is_local() {
        let err = SyncError::from(CollectionError::UnsavedParent);
        assert!(!err.is_network());
        assert!(!err.is_retryable());
        assert_eq!(err.reason(), None);
    }

    #[test]
    fn remove_error_display() {
        let err = SyncError::Remove {
            reason: "network timeout".to_string(),
            items: vec!["hostA".into()],
            retryable: true,
        };
        assert_eq!(err.to_string(), "remove failed: network timeout");
        assert!(err.is_retryable());
        assert_eq!(err.reason(), Some("network timeout"));
    }

    #[test]
    fn load_failure_display() {
        let failure = LoadFailure {
            parent: ParentId::from(7),
            reason: "Not Found".to_string(),
            retryable: false,
        };
        assert_eq!(failure.to_string(), "failed to load collection of 7: Not Found");
    }
}
