//! Data-driven content for behavior trees.
//!
//! Node graphs, named subtree libraries, and tree tuning live in data files
//! next to the binary. This crate turns those files into the
//! [`behavior_tree`] types the builder consumes.
//!
//! Supported formats:
//! - node graphs: RON (`.ron`) or JSON (`.json`)
//! - tree tuning: TOML

#[cfg(feature = "loaders")]
pub mod factory;
#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use factory::ContentFactory;
#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, GraphFormat, GraphLoader, LibraryLoader, LoadResult};
