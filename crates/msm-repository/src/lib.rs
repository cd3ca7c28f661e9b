//! MSM Repository
//!
//! Access to the Remote Collection Store: the server-held membership of
//! collections owned by a parent (hosts of a worker-manager, conditions of a
//! rule, ...).
//!
//! # Core Concepts
//!
//! - [`CollectionRepository`]: `load` / `add` / `remove` scoped by parent id
//! - [`HttpRepository`]: the manager REST API via `reqwest`
//! - [`InMemoryRepository`]: in-process store with the same semantics
//! - [`CollectionPath`]: `/<parent-collection>/<parentId>/<subresource>`
//!
//! # Example
//!
//! ```rust,ignore
//! use msm_repository::{CollectionPath, CollectionRepository, HttpRepository, RepositoryConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RepositoryConfig::from_env()?;
//! let repo = HttpRepository::new(&config, CollectionPath::new("worker-managers", "assigned-hosts"))?;
//!
//! let hosts = repo.load(&42u64.into()).await?;
//! repo.remove(&42u64.into(), &hosts[..1]).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod path;
pub mod repository;

pub use config::RepositoryConfig;
pub use error::{RepositoryError, Result};
pub use http::{decode_ids, HttpRepository};
pub use memory::InMemoryRepository;
pub use path::CollectionPath;
pub use repository::CollectionRepository;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
