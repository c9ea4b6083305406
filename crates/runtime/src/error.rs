use behavior_tree::BuildError;
use thiserror::Error;

/// Runtime errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Graph, library, or tuning file could not be loaded
    #[error("content error: {0:#}")]
    Content(#[from] anyhow::Error),

    /// The loaded graph did not build into a tree
    #[error("tree build failed: {0}")]
    Build(#[from] BuildError),

    /// Frame rate must be positive
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(u32),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
