//! In-process collection store
//!
//! Backs demos and tests with the same bulk, all-or-nothing semantics as the
//! REST backend.

use crate::error::{RepositoryError, Result};
use crate::repository::CollectionRepository;
use async_trait::async_trait;
use dashmap::DashMap;
use msm_collection::{ItemId, Membership, ParentId};

/// Collection store kept in a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    collections: DashMap<ParentId, Membership>,
    /// Reject parents that were never registered
    strict: bool,
}

impl InMemoryRepository {
    /// Create empty store that creates collections on first write
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty store that only knows registered parents
    #[inline]
    #[must_use]
    pub fn strict() -> Self {
        Self {
            collections: DashMap::new(),
            strict: true,
        }
    }

    /// Register a parent with initial members
    #[must_use]
    pub fn with_parent(self, parent: impl Into<ParentId>, items: impl IntoIterator<Item = ItemId>) -> Self {
        self.collections.insert(parent.into(), items.into_iter().collect());
        self
    }

    /// Snapshot of a parent's members
    #[must_use]
    pub fn members(&self, parent: &ParentId) -> Vec<ItemId> {
        self.collections
            .get(parent)
            .map(|entry| entry.to_vec())
            .unwrap_or_default()
    }

    /// Number of parents with a collection
    #[inline]
    #[must_use]
    pub fn parent_count(&self) -> usize {
        self.collections.len()
    }

    fn check_parent(&self, parent: &ParentId) -> Result<()> {
        if self.strict && !self.collections.contains_key(parent) {
            return Err(RepositoryError::UnknownParent(parent.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionRepository for InMemoryRepository {
    async fn load(&self, parent: &ParentId) -> Result<Vec<ItemId>> {
        self.check_parent(parent)?;
        Ok(self.members(parent))
    }

    async fn add(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        self.check_parent(parent)?;
        let mut entry = self.collections.entry(parent.clone()).or_default();
        entry.extend(items.iter().cloned());
        Ok(())
    }

    async fn remove(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        self.check_parent(parent)?;
        let mut entry = self.collections.entry(parent.clone()).or_default();

        let missing: Vec<&str> = items
            .iter()
            .filter(|item| !entry.contains(item))
            .map(ItemId::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(RepositoryError::Status {
                status: 404,
                reason: format!("not assigned: {}", missing.join(", ")),
            });
        }

        for item in items {
            entry.remove(item);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<ItemId> {
        items.iter().map(|s| ItemId::from(*s)).collect()
    }

    #[tokio::test]
    async fn add_then_load() {
        let repo = InMemoryRepository::new();
        let parent = ParentId::from(1);

        repo.add(&parent, &ids(&["a", "b", "a"])).await.unwrap();
        assert_eq!(repo.load(&parent).await.unwrap(), ids(&["a", "b"]));
    }

    #[tokio::test]
    async fn remove_is_all_or_nothing() {
        let repo = InMemoryRepository::new().with_parent(7, ids(&["a", "b"]));
        let parent = ParentId::from(7);

        let err = repo.remove(&parent, &ids(&["a", "zz"])).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Status { status: 404, .. }));
        assert_eq!(repo.members(&parent), ids(&["a", "b"]));

        repo.remove(&parent, &ids(&["a"])).await.unwrap();
        assert_eq!(repo.members(&parent), ids(&["b"]));
    }

    #[tokio::test]
    async fn strict_store_rejects_unknown_parent() {
        let repo = InMemoryRepository::strict().with_parent(1, Vec::new());

        assert!(repo.load(&ParentId::from(1)).await.is_ok());
        let err = repo.load(&ParentId::from(2)).await.unwrap_err();
        assert_eq!(err, RepositoryError::UnknownParent(ParentId::from(2)));
    }
}
