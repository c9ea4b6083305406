//! Node-graph loader.
//!
//! Graph files are plain serializations of [`TreeGraph`]. RON is the
//! authoring format; JSON is accepted for graphs exported by other tools.
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     variables: [(name: "speed", kind: Float, value: "2.5")],
//!     nodes: [
//!         (kind: "RootNode", id: "root", children: ["seq"]),
//!         (kind: "Sequencer", id: "seq", children: ["wait"]),
//!         (kind: "ActionNode", id: "wait", params: (unit: "WaitOneFrame")),
//!     ],
//! )
//! ```

use std::path::Path;

use behavior_tree::TreeGraph;

use crate::loaders::{LoadResult, read_file};

/// Serialization format of a graph file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Ron,
    Json,
}

impl GraphFormat {
    /// Picks the format from a file extension. Unknown extensions are `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("ron") {
            Some(GraphFormat::Ron)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(GraphFormat::Json)
        } else {
            None
        }
    }
}

/// Loader for [`TreeGraph`] files.
pub struct GraphLoader;

impl GraphLoader {
    /// Load a graph, choosing the format from the file extension.
    pub fn load(path: &Path) -> LoadResult<TreeGraph> {
        let format = GraphFormat::from_path(path).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported graph file {} (expected .ron or .json)",
                path.display()
            )
        })?;
        let content = read_file(path)?;
        Self::parse(&content, format)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    pub fn parse(content: &str, format: GraphFormat) -> LoadResult<TreeGraph> {
        let graph: TreeGraph = match format {
            GraphFormat::Ron => ron::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse graph RON: {}", e))?,
            GraphFormat::Json => serde_json::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse graph JSON: {}", e))?,
        };
        tracing::debug!(
            nodes = graph.nodes.len(),
            variables = graph.variables.len(),
            "graph parsed"
        );
        Ok(graph)
    }
}
