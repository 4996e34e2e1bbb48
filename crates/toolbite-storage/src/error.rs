use thiserror::Error;
use toolbite_core::TransformError;

/// Ephemeral storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Could not find a free location after {0} attempts")]
    Exhausted(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for TransformError {
    fn from(err: StorageError) -> Self {
        TransformError::Storage(err.to_string())
    }
}
