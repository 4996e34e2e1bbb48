use crate::engines::{DocumentRenderer, HtmlConverter};
use crate::template::{self, PageSetup};
use crate::traits::{StoragePlan, TransformStrategy, Workspace};
use async_trait::async_trait;
use std::sync::Arc;
use toolbite_core::{Artifact, Operation, TransformError, TransformResult};

const HTML_FILE: &str = "document.html";
const MEDIA_DIR: &str = "media";

/// Word document to paginated PDF: HTML intermediate, fixed template, then a
/// fresh layout-engine session that is closed on every path.
pub struct DocumentRender {
    converter: Arc<dyn HtmlConverter>,
    renderer: Arc<dyn DocumentRenderer>,
    page: PageSetup,
}

impl DocumentRender {
    pub fn new(converter: Arc<dyn HtmlConverter>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self {
            converter,
            renderer,
            page: PageSetup::a4(),
        }
    }
}

fn engine_error(source: impl Into<anyhow::Error>) -> TransformError {
    TransformError::engine(Operation::RenderDocument, source)
}

#[async_trait]
impl TransformStrategy for DocumentRender {
    fn operation(&self) -> Operation {
        Operation::RenderDocument
    }

    fn storage_plan(&self) -> StoragePlan {
        StoragePlan::STAGED_WITH_SCRATCH
    }

    async fn transform(&self, workspace: &Workspace) -> Result<TransformResult, TransformError> {
        let input = workspace.input_path()?;
        let scratch = workspace.scratch_dir()?.path();

        let body = self
            .converter
            .to_html(input, &scratch.join(MEDIA_DIR))
            .await
            .map_err(engine_error)?;

        let html_path = scratch.join(HTML_FILE);
        tokio::fs::write(&html_path, template::wrap_document(&body, &self.page))
            .await
            .map_err(engine_error)?;

        let mut session = self
            .renderer
            .open_session(scratch)
            .await
            .map_err(engine_error)?;

        tracing::debug!(
            request_id = %workspace.request_id,
            converter = self.converter.name(),
            renderer = self.renderer.name(),
            "Render session opened"
        );

        let rendered = session.render_pdf(&html_path, &self.page).await;

        if let Err(e) = session.close().await {
            tracing::warn!(
                request_id = %workspace.request_id,
                error = %e,
                "Failed to close render session"
            );
        }

        let pdf = rendered.map_err(engine_error)?;
        Ok(TransformResult::Single(Artifact::new(pdf, "application/pdf")))
    }
}
