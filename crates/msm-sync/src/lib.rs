//! MSM Sync - Optimistic Collection Synchronizer
//!
//! Keeps a list screen's view of a parent's sub-collection consistent with
//! the backend:
//! - Loads confirmed membership when a parent is selected
//! - Stages additions locally and persists them in one bulk commit
//! - Removes confirmed items in one bulk request
//! - Discards responses that arrive after the parent changed
//! - Emits notifications for every network outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use msm_sync::prelude::*;
//! use msm_repository::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sync = CollectionSynchronizer::new(
//!     InMemoryRepository::new(),
//!     CollectionBinding::worker_manager_hosts(),
//! );
//! sync.set_known(["hostA", "hostB"].into_iter().map(ItemId::from));
//!
//! // Worker-manager is being created: stage first, commit once it has an id.
//! sync.add(ItemId::from("hostA"))?;
//! sync.commit(ParentId::from(42)).await?;
//!
//! assert_eq!(sync.view().collection.confirmed.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod binding;
pub mod cache;
pub mod config;
pub mod error;
pub mod notification;
pub mod presentation;
pub mod synchronizer;

pub use binding::{CollectionBinding, CollectionLabels};
pub use cache::{CacheKey, CacheStats, MembershipCache};
pub use config::{ConfigError, SyncConfig};
pub use error::{LoadFailure, SyncError};
pub use notification::{
    EventLog, NoopObserver, Notification, NotificationKind, SyncEvent, SyncObserver,
};
pub use presentation::{rows, DropdownConfig, ItemRow, Selection};
pub use synchronizer::{
    CollectionSynchronizer, CommitOutcome, LoadOutcome, LoadState, PendingOperation,
    RemoveOutcome, StagingState, SyncView, UnassignOutcome,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving list screens
    pub use crate::{
        CollectionBinding, CollectionSynchronizer, CommitOutcome, LoadOutcome, LoadState,
        Notification, Selection, SyncError, SyncObserver, SyncView,
    };
    pub use msm_collection::{ItemId, MembershipSource, ParentEntity, ParentId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use msm_collection::{ItemId, ParentEntity, ParentId};
    use msm_repository::InMemoryRepository;
    use std::sync::Arc;

    fn hosts() -> Vec<ItemId> {
        ["hostA", "hostB", "hostC"].into_iter().map(ItemId::from).collect()
    }

    #[tokio::test]
    async fn create_then_edit_flow() {
        let log = Arc::new(EventLog::new());
        let sync = CollectionSynchronizer::new(
            Arc::new(InMemoryRepository::new()),
            CollectionBinding::worker_manager_hosts(),
        )
        .with_observer(log.clone());
        sync.set_known(hosts());

        sync.add("hostA".into()).unwrap();
        sync.add("hostB".into()).unwrap();
        sync.commit(ParentId::from(42)).await.unwrap();
        assert_eq!(
            log.last_notification().unwrap().message,
            "2 hosts assigned to worker-manager 42"
        );

        sync.remove(&["hostB".into()]).await.unwrap();
        assert_eq!(
            log.last_notification().unwrap().message,
            "Host hostB unassigned from worker-manager 42"
        );

        let view = sync.view();
        assert_eq!(view.collection.confirmed.to_vec(), vec![ItemId::from("hostA")]);
        assert_eq!(view.collection.candidates.len(), 2);
    }

    #[tokio::test]
    async fn mirror_is_shared_between_screens() {
        let repo = Arc::new(InMemoryRepository::new().with_parent(7, [ItemId::from("hostA")]));
        let cache = MembershipCache::default();
        let binding = CollectionBinding::worker_manager_hosts();

        let list = CollectionSynchronizer::new(repo.clone(), binding.clone()).with_cache(cache.clone());
        list.select_parent(ParentEntity::persisted(7)).await;

        let key = CacheKey::new(binding.path.clone(), ParentId::from(7));
        assert_eq!(cache.get(&key).await.unwrap().len(), 1);
    }
}
