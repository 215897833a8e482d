use thiserror::Error;

use crate::storage::StorageError;

/// Startup and serve failures
///
/// Request-level failures use [`shared::AppError`] instead.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage initialization failed: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
