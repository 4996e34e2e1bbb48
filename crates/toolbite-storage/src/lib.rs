//! ToolBite Storage Library
//!
//! Per-request temporary storage. Every file or directory handed out by the
//! [`EphemeralStore`] is owned by a [`StorageLease`] and removed exactly once:
//! explicitly through `release`, or on drop if the owner never got that far.
//!
//! # Handle naming
//!
//! Handles live directly under the store's base path and are named
//! `{nanos}-{request_id}-{sequence}-{random}[.ext]`. Creation uses
//! `create_new` / `create_dir`, so a name collision fails on the filesystem
//! instead of silently sharing a location. Startup purging only removes
//! entries of this shape.

pub mod error;
pub(crate) mod keys;
pub mod lease;
pub mod scope;
pub mod store;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use lease::{ReleaseOutcome, StorageLease};
pub use scope::{RequestScope, ScopeReport};
pub use store::{EphemeralStore, EphemeralStoreConfig, HandleKind, StorageHandle};
