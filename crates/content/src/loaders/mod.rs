//! File loaders for tree content.

pub mod config;
pub mod graph;
pub mod library;

pub use config::ConfigLoader;
pub use graph::{GraphFormat, GraphLoader};
pub use library::LibraryLoader;

use std::path::Path;

/// Result type for content loading.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
