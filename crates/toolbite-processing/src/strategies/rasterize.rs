use crate::engines::PdfRasterizer;
use crate::pages::{self, PageSelection};
use crate::traits::{StoragePlan, TransformStrategy, Workspace};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use toolbite_core::{Artifact, Operation, TransformError, TransformOptions, TransformResult};

pub const PAGES_OPTION: &str = "pages";

/// PDF to one PNG per page, returned in page order.
pub struct Rasterization {
    rasterizer: Arc<dyn PdfRasterizer>,
}

impl Rasterization {
    pub fn new(rasterizer: Arc<dyn PdfRasterizer>) -> Self {
        Self { rasterizer }
    }
}

fn engine_error(source: impl Into<anyhow::Error>) -> TransformError {
    TransformError::engine(Operation::Rasterize, source)
}

#[async_trait]
impl TransformStrategy for Rasterization {
    fn operation(&self) -> Operation {
        Operation::Rasterize
    }

    fn storage_plan(&self) -> StoragePlan {
        StoragePlan::STAGED_WITH_SCRATCH
    }

    fn validate_options(&self, options: &TransformOptions) -> Result<(), TransformError> {
        PageSelection::parse(options.get(PAGES_OPTION)).map(|_| ())
    }

    async fn transform(&self, workspace: &Workspace) -> Result<TransformResult, TransformError> {
        let selection = PageSelection::parse(workspace.options.get(PAGES_OPTION))?;
        let input = workspace.input_path()?;
        let out_dir = workspace.scratch_dir()?.path();

        self.rasterizer
            .rasterize(input, out_dir, &selection)
            .await
            .map_err(engine_error)?;

        let rendered = pages::collect_pages(out_dir).await.map_err(engine_error)?;
        if rendered.is_empty() {
            return Err(engine_error(anyhow!("{} rendered no pages", self.rasterizer.name())));
        }

        let mut images = Vec::with_capacity(rendered.len());
        for (_, path) in &rendered {
            let bytes = tokio::fs::read(path).await.map_err(engine_error)?;
            images.push(Artifact::new(bytes, "image/png"));
        }

        tracing::debug!(
            request_id = %workspace.request_id,
            engine = self.rasterizer.name(),
            pages = images.len(),
            "PDF rasterized"
        );

        Ok(TransformResult::Sequence(images))
    }
}
