//! MSM Collection Model
//!
//! Membership model for collections owned by a parent entity: hosts assigned
//! to a worker-manager, conditions attached to a rule, services of an app.
//!
//! # Core Concepts
//!
//! - [`ItemId`] / [`ParentId`]: opaque, string-backed identifiers
//! - [`ParentEntity`]: unsaved (being created) or persisted
//! - [`CollectionState`]: confirmed, staged and known items with checked transitions
//! - [`CollectionView`]: typed projection `{confirmed, staged, candidates}`
//!
//! # Example
//!
//! ```rust
//! use msm_collection::{CollectionState, ItemId, ParentEntity, ParentId, project};
//!
//! let mut state = CollectionState::new(ParentEntity::Unsaved);
//! state.set_known(["hostA", "hostB"].into_iter().map(ItemId::from));
//! state.stage(ItemId::from("hostA")).unwrap();
//!
//! state.persist(ParentId::from(42)).unwrap();
//! state.confirm_staged(&[ItemId::from("hostA")]).unwrap();
//!
//! let view = project(&state);
//! assert_eq!(view.confirmed.len(), 1);
//! assert_eq!(view.candidates.to_vec(), vec![ItemId::from("hostB")]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod id;
mod membership;
mod state;
mod view;

pub use error::CollectionError;
pub use id::{ItemId, ParentEntity, ParentId};
pub use membership::{Membership, MembershipSource};
pub use state::{CollectionState, Partition};
pub use view::{project, CollectionView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
