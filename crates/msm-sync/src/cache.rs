//! Store mirror of confirmed membership using moka
//!
//! Shared by every synchronizer of a dashboard so other screens (counts in a
//! worker-manager table, for instance) can read what list screens confirmed.

use crate::config::SyncConfig;
use moka::future::Cache;
use msm_collection::{ItemId, ParentId};
use msm_repository::CollectionPath;
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Cache key: which sub-collection of which parent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: CollectionPath,
    parent: ParentId,
}

impl CacheKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(path: CollectionPath, parent: ParentId) -> Self {
        Self { path, parent }
    }

    /// Sub-collection
    #[inline]
    #[must_use]
    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Parent id
    #[inline]
    #[must_use]
    pub fn parent(&self) -> &ParentId {
        &self.parent
    }
}

/// Confirmed members per parent, as last acknowledged by the backend
///
/// Cloning is cheap; clones share the same entries.
#[derive(Debug, Clone)]
pub struct MembershipCache {
    inner: Cache<CacheKey, Arc<Vec<ItemId>>>,
}

impl MembershipCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Create cache from configuration
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        match config.cache_ttl() {
            Some(ttl) => Self::with_ttl(config.cache_capacity, ttl),
            None => Self::new(config.cache_capacity),
        }
    }

    /// Record confirmed members
    #[inline]
    pub async fn insert(&self, key: CacheKey, items: Vec<ItemId>) {
        self.inner.insert(key, Arc::new(items)).await;
    }

    /// Confirmed members, if mirrored
    #[inline]
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Vec<ItemId>>> {
        self.inner.get(key).await
    }

    /// Forget one parent's members
    #[inline]
    pub async fn invalidate(&self, key: &CacheKey) {
        self.inner.invalidate(key).await;
    }

    /// Forget everything
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Check if a parent's members are mirrored
    #[inline]
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.get(key).await.is_some()
    }

    /// Get cache statistics after flushing pending maintenance
    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for MembershipCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}
