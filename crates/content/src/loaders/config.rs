//! Tree tuning loader.

use std::path::Path;

use behavior_tree::TreeConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`TreeConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load tree tuning from a TOML file.
    ///
    /// Missing keys fall back to the [`TreeConfig`] defaults.
    pub fn load(path: &Path) -> LoadResult<TreeConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<TreeConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ConfigLoader::parse("seed = 42\nloop_period_ms = 100\n").unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.loop_period(), Duration::from_millis(100));
        assert_eq!(config.poll_period_ms, TreeConfig::DEFAULT_POLL_PERIOD_MS);
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(ConfigLoader::parse("").unwrap(), TreeConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let err = ConfigLoader::parse("loop_period_ms = \"fast\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config TOML"));
    }
}
