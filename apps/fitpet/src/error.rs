//! Application-level errors: core failures plus what only the binary can hit.

use fitpet_core::FitpetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] FitpetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("invalid argument: {0}")]
    Usage(String),
}
