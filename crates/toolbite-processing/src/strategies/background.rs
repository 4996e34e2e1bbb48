use crate::engines::BackgroundRemover;
use crate::traits::{StoragePlan, TransformStrategy, Workspace};
use async_trait::async_trait;
use std::sync::Arc;
use toolbite_core::{Artifact, Operation, TransformError, TransformResult};

/// Subject/background separation. No options; the engine output is a PNG.
pub struct BackgroundRemoval {
    remover: Arc<dyn BackgroundRemover>,
}

impl BackgroundRemoval {
    pub fn new(remover: Arc<dyn BackgroundRemover>) -> Self {
        Self { remover }
    }
}

#[async_trait]
impl TransformStrategy for BackgroundRemoval {
    fn operation(&self) -> Operation {
        Operation::RemoveBackground
    }

    fn storage_plan(&self) -> StoragePlan {
        StoragePlan::STAGED
    }

    async fn transform(&self, workspace: &Workspace) -> Result<TransformResult, TransformError> {
        let input = workspace.input_path()?;

        tracing::debug!(
            request_id = %workspace.request_id,
            engine = self.remover.name(),
            "Removing background"
        );

        let png = self
            .remover
            .remove_background(input)
            .await
            .map_err(|e| TransformError::engine(Operation::RemoveBackground, e))?;

        Ok(TransformResult::Single(Artifact::new(png, "image/png")))
    }
}
