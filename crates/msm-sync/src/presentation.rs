//! Row, selection and dropdown models for list screens

use crate::binding::CollectionLabels;
use msm_collection::{CollectionView, ItemId, Membership, MembershipSource};
use serde::{Deserialize, Serialize};

/// Items ticked in a list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Membership);

impl Selection {
    /// Create empty selection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip an item's checkbox, returning whether it is now checked
    pub fn toggle(&mut self, item: &ItemId) -> bool {
        if self.0.remove(item) {
            false
        } else {
            self.0.insert(item.clone());
            true
        }
    }

    /// Check if item is ticked
    #[inline]
    #[must_use]
    pub fn is_checked(&self, item: &ItemId) -> bool {
        self.0.contains(item)
    }

    /// Ticked items in tick order
    #[inline]
    #[must_use]
    pub fn items(&self) -> Vec<ItemId> {
        self.0.to_vec()
    }

    /// Check if nothing is ticked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Untick everything
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Untick items no longer listed
    pub fn prune(&mut self, view: &CollectionView) {
        self.0 = self
            .0
            .iter()
            .filter(|item| view.confirmed.contains(item) || view.staged.contains(item))
            .cloned()
            .collect();
    }
}

/// One row of a collection list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    /// Item shown
    pub item: ItemId,
    /// Confirmed or staged
    pub source: MembershipSource,
    /// Checkbox state
    pub checked: bool,
}

/// Rows for `view`: confirmed members first, then staged ones
#[must_use]
pub fn rows(view: &CollectionView, selection: &Selection) -> Vec<ItemRow> {
    let confirmed = view
        .confirmed
        .iter()
        .map(|item| (item, MembershipSource::Confirmed));
    let staged = view.staged.iter().map(|item| (item, MembershipSource::Staged));

    confirmed
        .chain(staged)
        .map(|(item, source)| ItemRow {
            item: item.clone(),
            source,
            checked: selection.is_checked(item),
        })
        .collect()
}

/// Configuration of the "add" dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownConfig {
    /// Title shown on the button
    pub title: String,
    /// Shown when there is nothing left to add
    pub empty_message: String,
    /// Selectable candidates in known order
    pub options: Vec<ItemId>,
}

impl DropdownConfig {
    /// Dropdown offering the view's candidates
    #[must_use]
    pub fn for_view(view: &CollectionView, labels: &CollectionLabels) -> Self {
        Self {
            title: format!("{} {}", capitalize_first(&labels.add_verb), labels.singular),
            empty_message: format!("No {} to {}", labels.plural, labels.add_verb),
            options: view.candidates.to_vec(),
        }
    }

    /// Check if the dropdown should be disabled
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use msm_collection::{project, CollectionState, ParentEntity};

    fn view() -> CollectionView {
        let mut state = CollectionState::new(ParentEntity::persisted(7));
        state.set_known(["hostA", "hostB", "hostC"].into_iter().map(ItemId::from));
        state.replace_confirmed([ItemId::from("hostA")]).unwrap();
        state.stage("hostB".into()).unwrap();
        project(&state)
    }

    #[test]
    fn toggle_flips_checkbox() {
        let mut selection = Selection::new();
        assert!(selection.toggle(&"hostA".into()));
        assert!(selection.is_checked(&"hostA".into()));
        assert!(!selection.toggle(&"hostA".into()));
        assert!(selection.is_empty());
    }

    #[test]
    fn rows_list_confirmed_then_staged() {
        let mut selection = Selection::new();
        selection.toggle(&"hostB".into());

        let rows = rows(&view(), &selection);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item, ItemId::from("hostA"));
        assert_eq!(rows[0].source, MembershipSource::Confirmed);
        assert!(!rows[0].checked);
        assert_eq!(rows[1].source, MembershipSource::Staged);
        assert!(rows[1].checked);
    }

    #[test]
    fn prune_drops_vanished_items() {
        let mut selection = Selection::new();
        selection.toggle(&"hostA".into());
        selection.toggle(&"hostC".into());

        selection.prune(&view());
        assert_eq!(selection.items(), vec![ItemId::from("hostA")]);
    }

    #[test]
    fn dropdown_offers_candidates() {
        let labels = CollectionLabels::new("host", "hosts", "worker-manager").assignment();
        let dropdown = DropdownConfig::for_view(&view(), &labels);

        assert_eq!(dropdown.title, "Assign host");
        assert_eq!(dropdown.options, vec![ItemId::from("hostC")]);
        assert!(!dropdown.is_empty());
    }
}
