//! Error types module
//!
//! `TransformError` is the single error type that leaves the dispatcher. Each
//! variant describes its own HTTP presentation through `ErrorMetadata`, so the
//! API layer never has to inspect engine details to build a response.

use crate::models::Operation;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues like size limits
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "ENGINE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (never contains paths or engine output)
    fn client_message(&self) -> String;

    /// Whether the internal message must stay out of client responses
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Missing or empty upload, or a malformed option value.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    /// The wrapped engine rejected the input or failed internally.
    #[error("{operation} engine failed: {source:#}")]
    Engine {
        operation: Operation,
        client_message: String,
        #[source]
        source: anyhow::Error,
    },

    /// Temporary storage could not be allocated or staged.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransformError {
    pub fn validation(message: impl Into<String>) -> Self {
        TransformError::Validation(message.into())
    }

    /// Engine failure reported to the client with the operation's generic message.
    pub fn engine(operation: Operation, source: impl Into<anyhow::Error>) -> Self {
        Self::engine_with_message(operation, operation.failure_message(), source)
    }

    pub fn engine_with_message(
        operation: Operation,
        client_message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        TransformError::Engine {
            operation,
            client_message: client_message.into(),
            source: source.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TransformError::Validation(_))
    }
}

fn static_metadata(err: &TransformError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        TransformError::Validation(_) => (400, "VALIDATION_ERROR", false, LogLevel::Debug),
        TransformError::PayloadTooLarge { .. } => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Warn),
        TransformError::Engine { .. } => (500, "ENGINE_ERROR", true, LogLevel::Error),
        TransformError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        TransformError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for TransformError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            TransformError::Validation(msg) => msg.clone(),
            TransformError::PayloadTooLarge { max, .. } => format!(
                "File size exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            ),
            TransformError::Engine { client_message, .. } => client_message.clone(),
            TransformError::Storage(_) => "Temporary storage is unavailable".to_string(),
            TransformError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
