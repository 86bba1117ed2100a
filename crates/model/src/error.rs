//! Model artifact error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Buffer too short: need {need} bytes, have {have}")]
    BufferTooShort { need: usize, have: usize },

    #[error("Malformed model: {0}")]
    Malformed(String),

    #[error("Schema version mismatch: expected {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
