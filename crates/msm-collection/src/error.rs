//! Error types for membership state transitions

use crate::id::{ItemId, ParentId};

/// Rejected local state transition
///
/// These never involve the network; they describe a caller asking for a
/// transition the current membership does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// Item is not among the known items
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    /// Items are not confirmed members
    #[error("not confirmed members: {}", join(.0))]
    NotConfirmed(Vec<ItemId>),

    /// Items are not staged
    #[error("not staged: {}", join(.0))]
    NotStaged(Vec<ItemId>),

    /// Operation needs a persisted parent
    #[error("parent has not been saved yet")]
    UnsavedParent,

    /// Parent already persisted under another id
    #[error("parent mismatch: expected {expected}, got {actual}")]
    ParentMismatch {
        /// Id the state is bound to
        expected: ParentId,
        /// Id the caller supplied
        actual: ParentId,
    },
}

fn join(items: &[ItemId]) -> String {
    items
        .iter()
        .map(ItemId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
