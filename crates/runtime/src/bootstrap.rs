//! Loads content named by a [`SimConfig`] and assembles an [`Agent`].

use behavior_tree::{TreeBuilder, TreeConfig, TreeLibrary};
use tracing::info;
use tree_content::{ConfigLoader, GraphLoader, LibraryLoader};

use crate::agent::Agent;
use crate::config::SimConfig;
use crate::error::Result;
use crate::pawn::Pawn;
use crate::units::standard_units;

/// Loads the graph, library and tuning, and builds an agent driving a
/// fresh pawn with the standard units.
pub fn load_agent(config: &SimConfig) -> Result<Agent> {
    let graph = GraphLoader::load(&config.graph)?;
    let library = match &config.library_dir {
        Some(dir) => LibraryLoader::load(dir)?,
        None => TreeLibrary::new(),
    };
    let mut tuning = match &config.tree_config {
        Some(path) => ConfigLoader::load(path)?,
        None => TreeConfig::default(),
    };
    if let Some(seed) = config.seed {
        tuning = tuning.with_seed(seed);
    }

    let registry = standard_units();
    let tree = TreeBuilder::new(&registry)
        .with_library(&library)
        .with_config(tuning)
        .build(&graph)?;

    let pawn = match tuning.seed {
        Some(seed) => Pawn::seeded("pawn", seed),
        None => Pawn::new("pawn"),
    };

    info!(
        graph = %config.graph.display(),
        nodes = tree.node_count(),
        subtrees = library.len(),
        seed = ?tuning.seed,
        "tree loaded"
    );
    Ok(Agent::new(tree, pawn))
}
