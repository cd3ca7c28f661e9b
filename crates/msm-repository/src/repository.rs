//! Repository trait for remote collection stores
//!
//! Provides [`CollectionRepository`], the only way the synchronizer reaches
//! the backend.

use crate::error::Result;
use async_trait::async_trait;
use msm_collection::{ItemId, ParentId};
use std::sync::Arc;

/// Access to one kind of parent-owned collection in the backend
///
/// An instance is bound to a single sub-collection (e.g. the hosts assigned
/// to worker-managers); calls are scoped by parent id.
///
/// # Semantics
/// `add` and `remove` are bulk and all-or-nothing: an error means no item
/// changed membership.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Fetch the current members of the parent's collection
    async fn load(&self, parent: &ParentId) -> Result<Vec<ItemId>>;

    /// Add every item to the parent's collection
    async fn add(&self, parent: &ParentId, items: &[ItemId]) -> Result<()>;

    /// Remove every item from the parent's collection
    async fn remove(&self, parent: &ParentId, items: &[ItemId]) -> Result<()>;
}

#[async_trait]
impl<R: CollectionRepository + ?Sized> CollectionRepository for Arc<R> {
    async fn load(&self, parent: &ParentId) -> Result<Vec<ItemId>> {
        (**self).load(parent).await
    }

    async fn add(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        (**self).add(parent, items).await
    }

    async fn remove(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        (**self).remove(parent, items).await
    }
}
