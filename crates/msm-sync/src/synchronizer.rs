//! Collection synchronizer
//!
//! Mediates between list-screen actions and the backend:
//! - `add` stages locally, no network
//! - `commit` persists every staged item in one bulk request
//! - `remove` deletes confirmed items in one bulk request
//! - `discard` drops staged items locally
//!
//! Loads are tagged with a generation; a response that arrives after the
//! parent changed, or after a commit or remove changed the backend, is
//! discarded instead of applied. A load superseded by a commit or remove is
//! issued again once that mutation is applied.

use crate::binding::CollectionBinding;
use crate::cache::{CacheKey, MembershipCache};
use crate::error::{LoadFailure, SyncError};
use crate::notification::{Notification, NotificationKind, NoopObserver, SyncObserver};
use crate::presentation::{rows, DropdownConfig, ItemRow, Selection};
use msm_collection::{
    project, CollectionState, CollectionView, ItemId, Membership, ParentEntity, ParentId,
};
use msm_repository::{CollectionRepository, RepositoryError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether confirmed membership is known
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "failure")]
pub enum LoadState {
    /// Nothing requested (unsaved parent, or not mounted yet)
    #[default]
    Uninitialized,
    /// Request in flight
    Loading,
    /// Confirmed membership known
    Loaded,
    /// Request failed; shown inline until the next load
    Failed(LoadFailure),
}

impl LoadState {
    /// Check if the last load finished, successfully or not
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Loaded | Self::Failed(_))
    }
}

/// Whether there are uncommitted additions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingState {
    /// Nothing staged
    NoStaging,
    /// At least one staged item
    Staging,
}

/// Network operation in flight (drives loading indicators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    /// Loading confirmed membership
    Load,
    /// Bulk add
    Commit,
    /// Bulk remove
    Remove,
}

/// Result of a load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Response applied
    Applied {
        /// Number of confirmed members
        count: usize,
    },
    /// Request failed; state shows the failure
    Failed(LoadFailure),
    /// Parent changed or membership was mutated while in flight; response
    /// ignored
    Stale,
    /// Nothing to load (unsaved parent, or already loaded)
    Skipped,
}

impl LoadOutcome {
    /// Turn a failure into an error
    ///
    /// # Errors
    /// - `SyncError::Load` for [`LoadOutcome::Failed`]
    pub fn into_result(self) -> Result<Self, SyncError> {
        match self {
            Self::Failed(failure) => Err(SyncError::Load(failure)),
            other => Ok(other),
        }
    }
}

/// Result of a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Items persisted and confirmed
    Committed(Vec<ItemId>),
    /// Nothing was staged; no request sent
    NothingStaged,
}

/// Result of a remote removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Items removed from the backend and from confirmed membership
    Removed(Vec<ItemId>),
    /// No items given; no request sent
    Nothing,
}

/// Result of [`CollectionSynchronizer::unassign`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnassignOutcome {
    /// Staged items dropped locally
    pub discarded: Vec<ItemId>,
    /// Confirmed items removed through the backend
    pub removed: Vec<ItemId>,
}

/// Snapshot of everything a list screen renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncView {
    /// Confirmed, staged and candidate items
    pub collection: CollectionView,
    /// Load progress
    pub load: LoadState,
    /// Staging progress
    pub staging: StagingState,
    /// Requests in flight
    pub pending: Vec<PendingOperation>,
}

impl SyncView {
    /// Check if any request is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: CollectionState,
    load: LoadState,
    generation: u64,
    pending: Vec<PendingOperation>,
}

/// Marks an operation as in flight until dropped
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    op: PendingOperation,
}

impl<'a> InFlight<'a> {
    fn start(inner: &'a Mutex<Inner>, op: PendingOperation) -> Self {
        inner.lock().pending.push(op);
        Self { inner, op }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if let Some(idx) = inner.pending.iter().position(|p| *p == self.op) {
            inner.pending.remove(idx);
        }
    }
}

/// Keeps one parent's sub-collection in sync with the backend
///
/// Methods take `&self`; state sits behind a mutex that is never held across
/// an await, so independent operations may overlap.
pub struct CollectionSynchronizer<R> {
    repository: R,
    binding: CollectionBinding,
    cache: MembershipCache,
    observer: Arc<dyn SyncObserver>,
    inner: Mutex<Inner>,
}

impl<R> std::fmt::Debug for CollectionSynchronizer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionSynchronizer")
            .field("binding", &self.binding.name)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<R: CollectionRepository> CollectionSynchronizer<R> {
    /// Create synchronizer for an unsaved parent
    #[must_use]
    pub fn new(repository: R, binding: CollectionBinding) -> Self {
        Self {
            repository,
            binding,
            cache: MembershipCache::default(),
            observer: Arc::new(NoopObserver),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Share a store mirror with other synchronizers
    #[must_use]
    pub fn with_cache(mut self, cache: MembershipCache) -> Self {
        self.cache = cache;
        self
    }

    /// Route callbacks to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Binding this synchronizer serves
    #[inline]
    #[must_use]
    pub fn binding(&self) -> &CollectionBinding {
        &self.binding
    }

    /// Store mirror
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &MembershipCache {
        &self.cache
    }

    /// Current parent
    #[must_use]
    pub fn parent(&self) -> ParentEntity {
        self.inner.lock().state.parent().clone()
    }

    /// Replace the pool of items that may be added
    pub fn set_known(&self, items: impl IntoIterator<Item = ItemId>) {
        self.inner.lock().state.set_known(items);
    }

    /// Point the synchronizer at a parent and load its membership
    ///
    /// A different parent resets confirmed and staged items and supersedes
    /// any load still in flight. Selecting the current parent again only
    /// loads if nothing was loaded yet.
    pub async fn select_parent(&self, parent: ParentEntity) -> LoadOutcome {
        let (id, generation) = {
            let mut inner = self.inner.lock();
            let unchanged = *inner.state.parent() == parent;
            if unchanged && (parent.is_unsaved() || inner.load != LoadState::Uninitialized) {
                return LoadOutcome::Skipped;
            }

            inner.generation += 1;
            if !unchanged {
                inner.state.set_parent(parent.clone());
            }
            let Some(id) = parent.id().cloned() else {
                inner.load = LoadState::Uninitialized;
                return LoadOutcome::Skipped;
            };
            inner.load = LoadState::Loading;
            (id, inner.generation)
        };

        tracing::debug!(binding = %self.binding.name, parent = %id, generation, "parent selected");
        self.cache.invalidate(&self.cache_key(&id)).await;
        self.load(id, generation).await
    }

    /// Load the current parent's membership again
    ///
    /// Staged items are kept; any that the backend already reports as members
    /// stop being staged.
    ///
    /// # Errors
    /// - `SyncError::Rejected` if the parent is unsaved
    pub async fn reload(&self) -> Result<LoadOutcome, SyncError> {
        let (id, generation) = {
            let mut inner = self.inner.lock();
            let id = inner
                .state
                .parent()
                .id()
                .cloned()
                .ok_or(msm_collection::CollectionError::UnsavedParent)?;
            inner.generation += 1;
            inner.load = LoadState::Loading;
            (id, inner.generation)
        };
        Ok(self.load(id, generation).await)
    }

    async fn load(&self, parent: ParentId, generation: u64) -> LoadOutcome {
        let _in_flight = InFlight::start(&self.inner, PendingOperation::Load);
        let result = self.repository.load(&parent).await;

        let applied = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                tracing::debug!(
                    binding = %self.binding.name,
                    parent = %parent,
                    generation,
                    current = inner.generation,
                    "discarding stale load response"
                );
                return LoadOutcome::Stale;
            }

            let applied = match result {
                Ok(items) => inner
                    .state
                    .replace_confirmed(items)
                    .map(|()| inner.state.confirmed().to_vec())
                    .map_err(|e| LoadFailure {
                        parent: parent.clone(),
                        reason: e.to_string(),
                        retryable: false,
                    }),
                Err(e) => Err(load_failure(&parent, &e)),
            };
            inner.load = match &applied {
                Ok(_) => LoadState::Loaded,
                Err(failure) => LoadState::Failed(failure.clone()),
            };
            applied
        };

        match applied {
            Ok(confirmed) => {
                let count = confirmed.len();
                tracing::info!(binding = %self.binding.name, parent = %parent, count, "collection loaded");
                self.cache.insert(self.cache_key(&parent), confirmed).await;
                LoadOutcome::Applied { count }
            }
            Err(failure) => {
                tracing::warn!(binding = %self.binding.name, parent = %parent, "{failure}");
                LoadOutcome::Failed(failure)
            }
        }
    }

    /// Stage an item for addition; no network call
    ///
    /// Returns `false` if the item was already staged or confirmed.
    ///
    /// # Errors
    /// - `SyncError::Rejected` if the item is not a known item
    pub fn add(&self, item: ItemId) -> Result<bool, SyncError> {
        let staged = self.inner.lock().state.stage(item.clone())?;
        if staged {
            self.observer.on_assign(&item);
        }
        Ok(staged)
    }

    /// Drop staged items locally; no network call
    ///
    /// # Errors
    /// - `SyncError::Rejected` if any item is not staged; nothing changes
    pub fn discard(&self, items: &[ItemId]) -> Result<(), SyncError> {
        if items.is_empty() {
            return Ok(());
        }
        self.inner.lock().state.discard(items)?;
        self.observer.on_unassign(items);
        Ok(())
    }

    /// Drop every staged item (e.g. the operator cancelled creation)
    pub fn discard_all(&self) -> Vec<ItemId> {
        let dropped = self.inner.lock().state.discard_all();
        if !dropped.is_empty() {
            self.observer.on_unassign(&dropped);
        }
        dropped
    }

    /// Remove confirmed items through the backend in one bulk request
    ///
    /// On failure confirmed membership is untouched and a `RemoveFailed`
    /// notification names the items.
    ///
    /// # Errors
    /// - `SyncError::Rejected` if the parent is unsaved or an item is not
    ///   confirmed; no request is sent
    /// - `SyncError::Remove` if the backend rejected the request
    pub async fn remove(&self, items: &[ItemId]) -> Result<RemoveOutcome, SyncError> {
        let items = items.iter().cloned().collect::<Membership>().to_vec();
        if items.is_empty() {
            return Ok(RemoveOutcome::Nothing);
        }

        let parent = {
            let inner = self.inner.lock();
            inner.state.ensure_confirmed(&items)?;
            inner
                .state
                .parent()
                .id()
                .cloned()
                .ok_or(msm_collection::CollectionError::UnsavedParent)?
        };

        let _in_flight = InFlight::start(&self.inner, PendingOperation::Remove);
        if let Err(e) = self.repository.remove(&parent, &items).await {
            let reason = e.reason();
            tracing::warn!(binding = %self.binding.name, parent = %parent, count = items.len(), "remove failed: {reason}");
            self.notify(NotificationKind::RemoveFailed {
                reason: reason.clone(),
                items: items.to_vec(),
            });
            return Err(SyncError::Remove {
                reason,
                items: items.to_vec(),
                retryable: e.is_retryable(),
            });
        }

        let (mirror, refresh) = {
            let mut inner = self.inner.lock();
            if inner.state.parent().id() == Some(&parent) {
                // A reload may have landed while the request was in flight.
                let still_confirmed: Vec<ItemId> = items
                    .iter()
                    .filter(|item| inner.state.confirmed().contains(item))
                    .cloned()
                    .collect();
                if still_confirmed.len() != items.len() {
                    tracing::debug!(binding = %self.binding.name, "confirmed set changed during remove");
                }
                inner.state.remove_confirmed(&still_confirmed)?;
                let refresh = supersede_loads(&mut inner);
                (Some(inner.state.confirmed().to_vec()), refresh)
            } else {
                (None, None)
            }
        };
        self.sync_mirror(&parent, mirror).await;

        tracing::info!(binding = %self.binding.name, parent = %parent, count = items.len(), "items removed");
        self.observer.on_unassign(&items);
        self.notify(NotificationKind::Removed {
            parent: parent.clone(),
            items: items.clone(),
        });
        if let Some(generation) = refresh {
            self.load(parent, generation).await;
        }
        Ok(RemoveOutcome::Removed(items))
    }

    /// Take items out of the collection, wherever they live
    ///
    /// Staged items are discarded locally; confirmed ones go through
    /// [`remove`](Self::remove). An unsaved parent has no confirmed items, so
    /// it never reaches the network.
    ///
    /// # Errors
    /// - `SyncError::Rejected` if an item is neither staged nor confirmed;
    ///   nothing changes
    /// - `SyncError::Remove` if the backend rejected the confirmed part;
    ///   staged items are left in place too
    pub async fn unassign(&self, items: &[ItemId]) -> Result<UnassignOutcome, SyncError> {
        let partition = self.inner.lock().state.partition(items);
        if !partition.unknown.is_empty() {
            return Err(msm_collection::CollectionError::NotConfirmed(partition.unknown).into());
        }

        let removed = match self.remove(&partition.confirmed).await? {
            RemoveOutcome::Removed(items) => items,
            RemoveOutcome::Nothing => Vec::new(),
        };

        // Staged items may have been committed or discarded during the remove.
        let discarded: Vec<ItemId> = {
            let mut inner = self.inner.lock();
            let still_staged: Vec<ItemId> = partition
                .staged
                .into_iter()
                .filter(|item| inner.state.staged().contains(item))
                .collect();
            inner.state.discard(&still_staged)?;
            still_staged
        };
        if !discarded.is_empty() {
            self.observer.on_unassign(&discarded);
        }

        Ok(UnassignOutcome { discarded, removed })
    }

    /// Persist every staged item for `parent_id` in one bulk request
    ///
    /// An unsaved parent becomes persisted under `parent_id` first (it was
    /// just created). On failure the staged items stay for a retry.
    ///
    /// # Errors
    /// - `SyncError::Rejected` if already bound to a different parent id
    /// - `SyncError::Commit` if the backend rejected the request
    pub async fn commit(&self, parent_id: ParentId) -> Result<CommitOutcome, SyncError> {
        let items = {
            let mut inner = self.inner.lock();
            let was_unsaved = inner.state.parent().is_unsaved();
            inner.state.persist(parent_id.clone())?;
            if was_unsaved {
                // A parent created a moment ago has no members yet.
                inner.generation += 1;
                inner.load = LoadState::Loaded;
            }
            inner.state.staged().to_vec()
        };

        if items.is_empty() {
            return Ok(CommitOutcome::NothingStaged);
        }

        let _in_flight = InFlight::start(&self.inner, PendingOperation::Commit);
        if let Err(e) = self.repository.add(&parent_id, &items).await {
            let reason = e.reason();
            tracing::warn!(binding = %self.binding.name, parent = %parent_id, count = items.len(), "commit failed: {reason}");
            self.notify(NotificationKind::CommitFailed {
                parent: parent_id.clone(),
                reason: reason.clone(),
            });
            return Err(SyncError::Commit {
                parent: parent_id,
                reason,
                retryable: e.is_retryable(),
            });
        }

        let (mirror, refresh) = {
            let mut inner = self.inner.lock();
            if inner.state.parent().id() == Some(&parent_id) {
                inner.state.confirm_staged(&items)?;
                let refresh = supersede_loads(&mut inner);
                (Some(inner.state.confirmed().to_vec()), refresh)
            } else {
                (None, None)
            }
        };
        self.sync_mirror(&parent_id, mirror).await;

        tracing::info!(binding = %self.binding.name, parent = %parent_id, count = items.len(), "staged items committed");
        self.notify(NotificationKind::Committed {
            parent: parent_id.clone(),
            items: items.clone(),
        });
        if let Some(generation) = refresh {
            self.load(parent_id, generation).await;
        }
        Ok(CommitOutcome::Committed(items))
    }

    /// Typed projection of the current state
    #[must_use]
    pub fn view(&self) -> SyncView {
        let inner = self.inner.lock();
        let staging = if inner.state.staged().is_empty() {
            StagingState::NoStaging
        } else {
            StagingState::Staging
        };
        SyncView {
            collection: project(&inner.state),
            load: inner.load.clone(),
            staging,
            pending: inner.pending.clone(),
        }
    }

    /// Rows to render, with checkbox state from `selection`
    #[must_use]
    pub fn rows(&self, selection: &Selection) -> Vec<ItemRow> {
        rows(&self.view().collection, selection)
    }

    /// Configuration of the "add" dropdown
    #[must_use]
    pub fn dropdown(&self) -> DropdownConfig {
        DropdownConfig::for_view(&self.view().collection, &self.binding.labels)
    }

    fn cache_key(&self, parent: &ParentId) -> CacheKey {
        CacheKey::new(self.binding.path.clone(), parent.clone())
    }

    /// Write confirmed members through to the mirror, or drop the entry when
    /// the parent changed mid-flight and the members are unknown here
    async fn sync_mirror(&self, parent: &ParentId, confirmed: Option<Vec<ItemId>>) {
        let key = self.cache_key(parent);
        match confirmed {
            Some(items) => self.cache.insert(key, items).await,
            None => self.cache.invalidate(&key).await,
        }
    }

    fn notify(&self, kind: NotificationKind) {
        let notification = Notification::new(kind, &self.binding.labels);
        self.observer.on_notification(&notification);
    }
}

/// Invalidate loads issued before a successful mutation
///
/// Their snapshot predates the mutation. Returns the generation to load again
/// under when one of them was still in flight.
fn supersede_loads(inner: &mut Inner) -> Option<u64> {
    inner.generation += 1;
    (inner.load == LoadState::Loading).then_some(inner.generation)
}

fn load_failure(parent: &ParentId, err: &RepositoryError) -> LoadFailure {
    LoadFailure {
        parent: parent.clone(),
        reason: err.reason(),
        retryable: err.is_retryable(),
    }
}
