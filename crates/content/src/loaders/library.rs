//! Subtree library loader.

use std::path::Path;

use behavior_tree::TreeLibrary;

use crate::loaders::{GraphFormat, GraphLoader, LoadResult};

/// Loader for a directory of named subtree graphs.
///
/// Every `.ron` or `.json` file in the directory becomes one library entry,
/// named after its file stem: `subtrees/patrol.ron` is `"patrol"`. Other
/// files are skipped; subdirectories are not searched.
pub struct LibraryLoader;

impl LibraryLoader {
    pub fn load(dir: &Path) -> LoadResult<TreeLibrary> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| anyhow::anyhow!("Failed to read entry in {}: {}", dir.display(), e))?
                .path();
            if path.is_file() && GraphFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        // read_dir order is platform dependent
        paths.sort();

        let mut library = TreeLibrary::new();
        for path in paths {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid subtree file name: {}", path.display()))?
                .to_owned();
            let graph = GraphLoader::load(&path)?;
            if library.insert(name.clone(), graph).is_some() {
                anyhow::bail!("Duplicate subtree '{}' in {}", name, dir.display());
            }
        }

        tracing::info!(count = library.len(), dir = %dir.display(), "subtree library loaded");
        Ok(library)
    }
}
