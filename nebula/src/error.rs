//! Error types for the Nebula engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NebulaError {
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("Render loop is not running")]
    LoopStopped,

    #[error("Render loop failed: {0}")]
    LoopFailed(String),
}

pub type Result<T> = std::result::Result<T, NebulaError>;
