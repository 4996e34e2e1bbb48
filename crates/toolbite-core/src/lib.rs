//! ToolBite Core Library
//!
//! Domain models, the error taxonomy and configuration shared by the storage,
//! processing and API crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, EngineConfig, RasterizerBackend};
pub use error::{ErrorMetadata, LogLevel, TransformError};
pub use models::{
    Artifact, IncomingFile, Operation, Payload, PayloadSummary, StorageLocation,
    TransformOptions, TransformRequest, TransformResult,
};
