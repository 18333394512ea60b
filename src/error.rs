//! Error types surfaced at the orchestrator and platform boundaries

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("unknown game type: {0:?}")]
    UnknownGame(String),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
