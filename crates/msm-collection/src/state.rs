//! Membership state of one parent/collection pair
//!
//! [`CollectionState`] is the pure core of the synchronizer: every transition
//! is synchronous and either applies completely or leaves the state as it
//! was. Network outcomes are fed in by the caller once they are known.

use crate::error::CollectionError;
use crate::id::{ItemId, ParentEntity, ParentId};
use crate::membership::{Membership, MembershipSource};
use serde::{Deserialize, Serialize};

/// Items split by where they currently live
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Items confirmed by the backend
    pub confirmed: Vec<ItemId>,
    /// Items only staged locally
    pub staged: Vec<ItemId>,
    /// Items that are members of neither set
    pub unknown: Vec<ItemId>,
}

/// Confirmed, staged and known items for a single parent
///
/// # Invariants
/// - `confirmed` and `staged` never share an item
/// - an unsaved parent has no confirmed items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    parent: ParentEntity,
    known: Membership,
    confirmed: Membership,
    staged: Membership,
}

impl CollectionState {
    /// Create empty state for parent
    #[inline]
    #[must_use]
    pub fn new(parent: ParentEntity) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    /// Owning parent
    #[inline]
    #[must_use]
    pub fn parent(&self) -> &ParentEntity {
        &self.parent
    }

    /// All items that could ever be members
    #[inline]
    #[must_use]
    pub fn known(&self) -> &Membership {
        &self.known
    }

    /// Items acknowledged by the backend
    #[inline]
    #[must_use]
    pub fn confirmed(&self) -> &Membership {
        &self.confirmed
    }

    /// Items added locally and not yet persisted
    #[inline]
    #[must_use]
    pub fn staged(&self) -> &Membership {
        &self.staged
    }

    /// Switch to another parent, dropping confirmed and staged items
    ///
    /// Known items are kept; they describe the pool, not the parent.
    pub fn set_parent(&mut self, parent: ParentEntity) {
        self.parent = parent;
        self.confirmed.clear();
        self.staged.clear();
    }

    /// Record that the parent now has a durable id
    ///
    /// Staged items survive so they can be committed against the new id.
    ///
    /// # Errors
    /// - `CollectionError::ParentMismatch` if already persisted under another id
    pub fn persist(&mut self, id: ParentId) -> Result<(), CollectionError> {
        match &self.parent {
            ParentEntity::Unsaved => {
                self.parent = ParentEntity::Persisted(id);
                Ok(())
            }
            ParentEntity::Persisted(current) if *current == id => Ok(()),
            ParentEntity::Persisted(current) => Err(CollectionError::ParentMismatch {
                expected: current.clone(),
                actual: id,
            }),
        }
    }

    /// Replace the pool of known items
    pub fn set_known(&mut self, items: impl IntoIterator<Item = ItemId>) {
        self.known = items.into_iter().collect();
    }

    /// Check if item can be staged right now
    #[inline]
    #[must_use]
    pub fn is_selectable(&self, item: &ItemId) -> bool {
        self.known.contains(item) && self.source_of(item).is_none()
    }

    /// Known items in neither confirmed nor staged
    #[must_use]
    pub fn candidates(&self) -> Membership {
        self.known
            .iter()
            .filter(|item| self.source_of(item).is_none())
            .cloned()
            .collect()
    }

    /// Where an item currently lives
    #[must_use]
    pub fn source_of(&self, item: &ItemId) -> Option<MembershipSource> {
        if self.confirmed.contains(item) {
            Some(MembershipSource::Confirmed)
        } else if self.staged.contains(item) {
            Some(MembershipSource::Staged)
        } else {
            None
        }
    }

    /// Split items by membership source, dropping duplicates
    #[must_use]
    pub fn partition(&self, items: &[ItemId]) -> Partition {
        let mut seen = Membership::new();
        let mut partition = Partition::default();
        for item in items {
            if !seen.insert(item.clone()) {
                continue;
            }
            match self.source_of(item) {
                Some(MembershipSource::Confirmed) => partition.confirmed.push(item.clone()),
                Some(MembershipSource::Staged) => partition.staged.push(item.clone()),
                None => partition.unknown.push(item.clone()),
            }
        }
        partition
    }

    /// Stage an item for addition
    ///
    /// Returns `false` when the item is already staged or confirmed; staging
    /// is idempotent.
    ///
    /// # Errors
    /// - `CollectionError::UnknownItem` if the item is not a known item
    pub fn stage(&mut self, item: ItemId) -> Result<bool, CollectionError> {
        if self.source_of(&item).is_some() {
            return Ok(false);
        }
        if !self.known.contains(&item) {
            return Err(CollectionError::UnknownItem(item));
        }
        Ok(self.staged.insert(item))
    }

    /// Drop staged items locally
    ///
    /// # Errors
    /// - `CollectionError::NotStaged` listing every item that is not staged;
    ///   nothing is discarded in that case
    pub fn discard(&mut self, items: &[ItemId]) -> Result<(), CollectionError> {
        let missing: Vec<ItemId> = items
            .iter()
            .filter(|item| !self.staged.contains(item))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(CollectionError::NotStaged(missing));
        }
        for item in items {
            self.staged.remove(item);
        }
        Ok(())
    }

    /// Drop every staged item, returning them
    pub fn discard_all(&mut self) -> Vec<ItemId> {
        self.staged.drain()
    }

    /// Check that every item is a confirmed member
    ///
    /// # Errors
    /// - `CollectionError::UnsavedParent` if the parent has no id
    /// - `CollectionError::NotConfirmed` listing the offending items
    pub fn ensure_confirmed(&self, items: &[ItemId]) -> Result<(), CollectionError> {
        if self.parent.is_unsaved() {
            return Err(CollectionError::UnsavedParent);
        }
        let missing: Vec<ItemId> = items
            .iter()
            .filter(|item| !self.confirmed.contains(item))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CollectionError::NotConfirmed(missing))
        }
    }

    /// Apply a load result
    ///
    /// Staged items the backend already reports as members stop being staged.
    ///
    /// # Errors
    /// - `CollectionError::UnsavedParent` if the parent has no id
    pub fn replace_confirmed(
        &mut self,
        items: impl IntoIterator<Item = ItemId>,
    ) -> Result<(), CollectionError> {
        if self.parent.is_unsaved() {
            return Err(CollectionError::UnsavedParent);
        }
        self.confirmed = items.into_iter().collect();
        for item in self.confirmed.iter() {
            self.staged.remove(item);
        }
        Ok(())
    }

    /// Apply a successful bulk add: move `items` from staged to confirmed
    ///
    /// Items staged after the request was sent stay staged.
    ///
    /// # Errors
    /// - `CollectionError::UnsavedParent` if the parent has no id
    pub fn confirm_staged(&mut self, items: &[ItemId]) -> Result<(), CollectionError> {
        if self.parent.is_unsaved() {
            return Err(CollectionError::UnsavedParent);
        }
        for item in items {
            self.staged.remove(item);
            self.confirmed.insert(item.clone());
        }
        Ok(())
    }

    /// Apply a successful bulk remove
    ///
    /// # Errors
    /// - `CollectionError::NotConfirmed` if any item is not confirmed; nothing
    ///   is removed in that case
    pub fn remove_confirmed(&mut self, items: &[ItemId]) -> Result<(), CollectionError> {
        self.ensure_confirmed(items)?;
        for item in items {
            self.confirmed.remove(item);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(items: &[&str]) -> Vec<ItemId> {
        items.iter().map(|s| ItemId::from(*s)).collect()
    }

    fn loaded(parent: u64, confirmed: &[&str], known: &[&str]) -> CollectionState {
        let mut state = CollectionState::new(ParentEntity::persisted(parent));
        state.set_known(ids(known));
        state.replace_confirmed(ids(confirmed)).unwrap();
        state
    }

    #[test]
    fn stage_moves_candidate_into_staged() {
        let mut state = CollectionState::new(ParentEntity::Unsaved);
        state.set_known(ids(&["hostA", "hostB"]));

        assert!(state.stage("hostA".into()).unwrap());
        assert_eq!(state.staged().to_vec(), ids(&["hostA"]));
        assert_eq!(state.candidates().to_vec(), ids(&["hostB"]));
    }

    #[test]
    fn stage_twice_is_noop() {
        let mut state = CollectionState::new(ParentEntity::Unsaved);
        state.set_known(ids(&["hostA"]));

        assert!(state.stage("hostA".into()).unwrap());
        assert!(!state.stage("hostA".into()).unwrap());
        assert_eq!(state.staged().len(), 1);
    }

    #[test]
    fn stage_confirmed_item_is_noop() {
        let mut state = loaded(7, &["hostA"], &["hostA", "hostB"]);
        assert!(!state.stage("hostA".into()).unwrap());
        assert!(state.staged().is_empty());
    }

    #[test]
    fn stage_unknown_item_rejected() {
        let mut state = CollectionState::new(ParentEntity::Unsaved);
        let err = state.stage("ghost".into()).unwrap_err();
        assert_eq!(err, CollectionError::UnknownItem("ghost".into()));
    }

    #[test]
    fn unsaved_parent_cannot_confirm() {
        let mut state = CollectionState::new(ParentEntity::Unsaved);
        assert_eq!(
            state.replace_confirmed(ids(&["a"])),
            Err(CollectionError::UnsavedParent)
        );
        assert_eq!(
            state.ensure_confirmed(&ids(&["a"])),
            Err(CollectionError::UnsavedParent)
        );
        assert!(state.confirmed().is_empty());
    }

    #[test]
    fn discard_is_all_or_nothing() {
        let mut state = CollectionState::new(ParentEntity::Unsaved);
        state.set_known(ids(&["a", "b"]));
        state.stage("a".into()).unwrap();

        let err = state.discard(&ids(&["a", "b"])).unwrap_err();
        assert_eq!(err, CollectionError::NotStaged(ids(&["b"])));
        assert_eq!(state.staged().to_vec(), ids(&["a"]));

        state.discard(&ids(&["a"])).unwrap();
        assert!(state.staged().is_empty());
    }

    #[test]
    fn persist_keeps_staged_items() {
        let mut state = CollectionState::new(ParentEntity::Unsaved);
        state.set_known(ids(&["hostA", "hostB"]));
        state.stage("hostA".into()).unwrap();

        state.persist(ParentId::from(42)).unwrap();
        assert_eq!(state.parent(), &ParentEntity::persisted(42));
        assert_eq!(state.staged().to_vec(), ids(&["hostA"]));

        state.confirm_staged(&ids(&["hostA"])).unwrap();
        assert_eq!(state.confirmed().to_vec(), ids(&["hostA"]));
        assert!(state.staged().is_empty());
    }

    #[test]
    fn persist_under_other_id_rejected() {
        let mut state = CollectionState::new(ParentEntity::persisted(1));
        let err = state.persist(ParentId::from(2)).unwrap_err();
        assert!(matches!(err, CollectionError::ParentMismatch { .. }));
    }

    #[test]
    fn confirm_staged_leaves_late_additions_staged() {
        let mut state = CollectionState::new(ParentEntity::persisted(3));
        state.set_known(ids(&["a", "b"]));
        state.stage("a".into()).unwrap();
        state.stage("b".into()).unwrap();

        state.confirm_staged(&ids(&["a"])).unwrap();
        assert_eq!(state.confirmed().to_vec(), ids(&["a"]));
        assert_eq!(state.staged().to_vec(), ids(&["b"]));
    }

    #[test]
    fn replace_confirmed_unstages_overlap() {
        let mut state = CollectionState::new(ParentEntity::persisted(3));
        state.set_known(ids(&["a", "b"]));
        state.stage("a".into()).unwrap();

        state.replace_confirmed(ids(&["a"])).unwrap();
        assert!(state.staged().is_empty());
        assert!(state.confirmed().is_disjoint(state.staged()));
    }

    #[test]
    fn remove_confirmed_is_all_or_nothing() {
        let mut state = loaded(7, &["hostA", "hostB"], &["hostA", "hostB"]);

        let err = state.remove_confirmed(&ids(&["hostA", "hostC"])).unwrap_err();
        assert_eq!(err, CollectionError::NotConfirmed(ids(&["hostC"])));
        assert_eq!(state.confirmed().to_vec(), ids(&["hostA", "hostB"]));

        state.remove_confirmed(&ids(&["hostA"])).unwrap();
        assert_eq!(state.confirmed().to_vec(), ids(&["hostB"]));
    }

    #[test]
    fn partition_routes_by_source() {
        let mut state = loaded(7, &["a"], &["a", "b", "c"]);
        state.stage("b".into()).unwrap();

        let p = state.partition(&ids(&["a", "b", "zz", "a"]));
        assert_eq!(p.confirmed, ids(&["a"]));
        assert_eq!(p.staged, ids(&["b"]));
        assert_eq!(p.unknown, ids(&["zz"]));
    }

    #[test]
    fn set_parent_resets_membership() {
        let mut state = loaded(1, &["a"], &["a", "b"]);
        state.stage("b".into()).unwrap();

        state.set_parent(ParentEntity::persisted(2));
        assert!(state.confirmed().is_empty());
        assert!(state.staged().is_empty());
        assert_eq!(state.known().len(), 2);
    }
}
