//! Insertion-ordered membership sets

use crate::id::ItemId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Ordered set of collection items
///
/// Keeps the order items arrived in (server order for confirmed members,
/// click order for staged ones) while never holding an item twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Membership(IndexSet<ItemId>);

impl Membership {
    /// Create empty membership
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert item, returning `false` if it was already present
    #[inline]
    pub fn insert(&mut self, item: ItemId) -> bool {
        self.0.insert(item)
    }

    /// Remove item, keeping the order of the rest
    #[inline]
    pub fn remove(&mut self, item: &ItemId) -> bool {
        self.0.shift_remove(item)
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, item: &ItemId) -> bool {
        self.0.contains(item)
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.0.iter()
    }

    /// Remove every item
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Take all items out, leaving the set empty
    #[inline]
    pub fn drain(&mut self) -> Vec<ItemId> {
        self.0.drain(..).collect()
    }

    /// Copy items into a vector
    #[inline]
    #[must_use]
    pub fn to_vec(&self) -> Vec<ItemId> {
        self.0.iter().cloned().collect()
    }

    /// Check that no item is shared with `other`
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.0.is_disjoint(&other.0)
    }
}

impl FromIterator<ItemId> for Membership {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ItemId> for Membership {
    fn extend<I: IntoIterator<Item = ItemId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Membership {
    type Item = &'a ItemId;
    type IntoIter = indexmap::set::Iter<'a, ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Where an item currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipSource {
    /// Acknowledged by the backend
    Confirmed,
    /// Added locally, not yet persisted
    Staged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_deduplicates_and_keeps_order() {
        let mut m = Membership::new();
        assert!(m.insert("b".into()));
        assert!(m.insert("a".into()));
        assert!(!m.insert("b".into()));

        assert_eq!(m.to_vec(), vec![ItemId::from("b"), ItemId::from("a")]);
    }

    #[test]
    fn membership_remove_preserves_order() {
        let mut m: Membership = ["a", "b", "c"].into_iter().map(ItemId::from).collect();
        assert!(m.remove(&"a".into()));
        assert!(!m.remove(&"zz".into()));
        assert_eq!(m.to_vec(), vec![ItemId::from("b"), ItemId::from("c")]);
    }
}
