//! Error types for Experimento

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed metrics CSV: {0}")]
    MalformedCsv(String),

    #[error("State mismatch: {0}")]
    StateMismatch(String),

    #[error("Checkpoint digest mismatch: expected {expected}, got {got}")]
    DigestMismatch { expected: String, got: String },

    #[error("Logger error: {0}")]
    Logger(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
