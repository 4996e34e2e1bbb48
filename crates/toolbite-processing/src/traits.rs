//! The uniform strategy contract.

use async_trait::async_trait;
use toolbite_core::{Operation, Payload, TransformError, TransformOptions, TransformResult};
use toolbite_storage::StorageHandle;
use uuid::Uuid;

/// Storage a strategy needs before `transform` runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoragePlan {
    /// Write the upload to a request-scoped file.
    pub stage_input: bool,
    /// Allocate a request-scoped directory for engine output.
    pub scratch_dir: bool,
}

impl StoragePlan {
    pub const IN_MEMORY: StoragePlan = StoragePlan {
        stage_input: false,
        scratch_dir: false,
    };

    pub const STAGED: StoragePlan = StoragePlan {
        stage_input: true,
        scratch_dir: false,
    };

    pub const STAGED_WITH_SCRATCH: StoragePlan = StoragePlan {
        stage_input: true,
        scratch_dir: true,
    };

    pub fn allocates(&self) -> bool {
        self.stage_input || self.scratch_dir
    }
}

/// Everything a strategy may touch while it runs.
///
/// Borrowed for the duration of `transform`; the dispatcher releases the
/// underlying storage only after `transform` has returned.
#[derive(Debug)]
pub struct Workspace {
    pub request_id: Uuid,
    pub payload: Payload,
    pub options: TransformOptions,
    pub scratch_dir: Option<StorageHandle>,
}

impl Workspace {
    pub fn scratch_dir(&self) -> Result<&StorageHandle, TransformError> {
        self.scratch_dir
            .as_ref()
            .ok_or_else(|| TransformError::Internal("scratch directory was not allocated".into()))
    }

    pub fn input_path(&self) -> Result<&std::path::Path, TransformError> {
        self.payload
            .path()
            .ok_or_else(|| TransformError::Internal("payload was not staged".into()))
    }
}

/// One of the four interchangeable operation implementations.
#[async_trait]
pub trait TransformStrategy: Send + Sync {
    fn operation(&self) -> Operation;

    fn storage_plan(&self) -> StoragePlan {
        StoragePlan::IN_MEMORY
    }

    /// Size cap checked before any storage is allocated. `None` means uncapped.
    fn max_payload_bytes(&self) -> Option<usize> {
        None
    }

    /// Option checks that run before any storage is allocated.
    fn validate_options(&self, _options: &TransformOptions) -> Result<(), TransformError> {
        Ok(())
    }

    /// Run the engine. Everything in the result must be owned bytes.
    async fn transform(&self, workspace: &Workspace) -> Result<TransformResult, TransformError>;
}
