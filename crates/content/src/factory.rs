//! Content factory for loading tree content from a data directory.

use std::path::{Path, PathBuf};

use behavior_tree::{TreeConfig, TreeGraph, TreeLibrary};

use crate::loaders::{ConfigLoader, GraphLoader, LibraryLoader, LoadResult};

/// Content factory that loads tree content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── tree.toml
/// ├── trees/
/// │   ├── patrol.ron
/// │   └── guard.ron
/// └── subtrees/
///     └── look_around.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load tree tuning from `tree.toml`, or defaults if the file is absent.
    pub fn load_config(&self) -> LoadResult<TreeConfig> {
        let path = self.data_dir.join("tree.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no tree config; using defaults");
            return Ok(TreeConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load a graph from `trees/{name}.ron`, falling back to `.json`.
    pub fn load_tree(&self, name: &str) -> LoadResult<TreeGraph> {
        let trees = self.data_dir.join("trees");
        let ron = trees.join(format!("{}.ron", name));
        if ron.exists() {
            return GraphLoader::load(&ron);
        }
        GraphLoader::load(&trees.join(format!("{}.json", name)))
    }

    /// Load the subtree library from `subtrees/`, or an empty library if
    /// the directory is absent.
    pub fn load_library(&self) -> LoadResult<TreeLibrary> {
        let dir = self.data_dir.join("subtrees");
        if !dir.is_dir() {
            return Ok(TreeLibrary::new());
        }
        LibraryLoader::load(&dir)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn test_missing_optional_content_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(dir.path());

        assert_eq!(factory.load_config().unwrap(), TreeConfig::default());
        assert!(factory.load_library().unwrap().is_empty());
        assert!(factory.load_tree("patrol").is_err());
    }

    #[test]
    fn test_load_all() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("trees")).unwrap();
        fs::create_dir_all(dir.path().join("subtrees")).unwrap();
        fs::write(dir.path().join("tree.toml"), "seed = 7\n").unwrap();
        fs::write(
            dir.path().join("trees/guard.json"),
            r#"{ "nodes": [ { "kind": "RootNode", "id": "root" } ] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("subtrees/look.ron"), "(nodes: [])").unwrap();

        let factory = ContentFactory::new(dir.path());

        assert_eq!(factory.load_config().unwrap().seed, Some(7));
        assert_eq!(factory.load_tree("guard").unwrap().nodes.len(), 1);
        assert!(factory.load_library().unwrap().get("look").is_some());
    }
}
