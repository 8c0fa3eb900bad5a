//! # Streaming Error Types
//!
//! All errors that can occur while configuring or starting a world.
//! Steady-state streaming itself has no failure modes; late or orphaned
//! results are dropped and counted instead.

use loam_meshing::AtlasError;
use thiserror::Error;

/// Errors that can occur in the streaming layer.
#[derive(Error, Debug)]
pub enum StreamingError {
    /// Window side length is even or too small.
    #[error("invalid window size {size}: must be odd and greater than 1")]
    InvalidWindowSize {
        /// Size requested.
        size: usize,
    },

    /// World config could not be parsed.
    #[error("invalid world config: {0}")]
    Config(#[from] toml::de::Error),

    /// World config could not be read.
    #[error("failed to read world config: {0}")]
    Io(#[from] std::io::Error),

    /// Atlas table was rejected.
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    /// A worker thread could not be started.
    #[error("failed to spawn worker {index}: {reason}")]
    WorkerSpawn {
        /// Worker index.
        index: usize,
        /// OS error text.
        reason: String,
    },
}

/// Result type for streaming operations.
pub type StreamingResult<T> = Result<T, StreamingError>;
