//! Error types for pawnmark-script

use thiserror::Error;

/// Content and save loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error(transparent)]
    Core(#[from] pawnmark_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
