//! Simulation configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration required to load a tree and run the reference simulation.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Node-graph file (`.ron` or `.json`).
    pub graph: PathBuf,
    /// Directory of named subtrees for FunctionNodes.
    pub library_dir: Option<PathBuf>,
    /// Tree tuning TOML; defaults apply when absent.
    pub tree_config: Option<PathBuf>,
    pub frame_rate: u32,
    /// Stop after this many frames; `None` runs until the tree finishes.
    pub max_frames: Option<u64>,
    /// Overrides the tuning file's seed and seeds the pawn.
    pub seed: Option<u64>,
    pub session_id: Option<String>,
}

impl SimConfig {
    pub const DEFAULT_GRAPH: &'static str = "data/trees/patrol.ron";
    pub const DEFAULT_FRAME_RATE: u32 = 30;
    pub const DEFAULT_MAX_FRAMES: u64 = 600;

    pub fn new(graph: impl Into<PathBuf>) -> Self {
        Self {
            graph: graph.into(),
            library_dir: None,
            tree_config: None,
            frame_rate: Self::DEFAULT_FRAME_RATE,
            max_frames: Some(Self::DEFAULT_MAX_FRAMES),
            seed: None,
            session_id: None,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BT_GRAPH` - Node-graph file (default: `data/trees/patrol.ron`)
    /// - `BT_LIBRARY_DIR` - Subtree directory (default: none)
    /// - `BT_TREE_CONFIG` - Tree tuning TOML (default: none)
    /// - `BT_FRAME_RATE` - Frames per second (default: 30)
    /// - `BT_MAX_FRAMES` - Frame limit, `0` for unlimited (default: 600)
    /// - `BT_SEED` - Random seed (default: entropy)
    /// - `BT_SESSION_ID` - Session identifier for log files (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(graph) = env::var("BT_GRAPH") {
            config.graph = PathBuf::from(graph);
        }
        config.library_dir = env::var("BT_LIBRARY_DIR").ok().map(PathBuf::from);
        config.tree_config = env::var("BT_TREE_CONFIG").ok().map(PathBuf::from);

        if let Some(rate) = read_env::<u32>("BT_FRAME_RATE") {
            config.frame_rate = rate.max(1);
        }

        if let Some(frames) = read_env::<u64>("BT_MAX_FRAMES") {
            config.max_frames = (frames > 0).then_some(frames);
        }

        config.seed = read_env::<u64>("BT_SEED");
        config.session_id = env::var("BT_SESSION_ID").ok();

        config
    }

    /// Length of one frame.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GRAPH)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
