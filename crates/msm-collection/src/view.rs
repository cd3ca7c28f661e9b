//! Typed projection handed to the presentation layer

use crate::id::ParentEntity;
use crate::membership::Membership;
use crate::state::CollectionState;
use serde::{Deserialize, Serialize};

/// What a list screen needs to render a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionView {
    /// Owning parent
    pub parent: ParentEntity,
    /// Backend-acknowledged members
    pub confirmed: Membership,
    /// Local additions awaiting commit
    pub staged: Membership,
    /// Items offered by the "add" affordance
    pub candidates: Membership,
}

impl CollectionView {
    /// Number of rows a list would show (confirmed plus staged)
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.confirmed.len() + self.staged.len()
    }
}

/// Project state into a view
#[must_use]
pub fn project(state: &CollectionState) -> CollectionView {
    CollectionView {
        parent: state.parent().clone(),
        confirmed: state.confirmed().clone(),
        staged: state.staged().clone(),
        candidates: state.candidates(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ItemId;

    #[test]
    fn project_excludes_members_from_candidates() {
        let mut state = CollectionState::new(ParentEntity::persisted(1));
        state.set_known(["a", "b", "c"].into_iter().map(ItemId::from));
        state.replace_confirmed([ItemId::from("a")]).unwrap();
        state.stage("b".into()).unwrap();

        let view = project(&state);
        assert_eq!(view.candidates.to_vec(), vec![ItemId::from("c")]);
        assert_eq!(view.row_count(), 2);
    }
}
