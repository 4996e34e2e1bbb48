//! Builds the engine adapters and the strategy registry from configuration.
//!
//! Adapter selection happens here, once per process.

use crate::dispatch::StrategyRegistry;
use crate::engines::{
    BackgroundRemover, ChromiumRenderer, DocumentRenderer, HtmlConverter, PandocConverter,
    PdfRasterizer, PdftoppmRasterizer, RembgCli,
};
use crate::strategies::{BackgroundRemoval, DocumentRender, Rasterization, Recompression};
use anyhow::Result;
use std::sync::Arc;
use toolbite_core::{Config, EngineConfig, RasterizerBackend};

/// One adapter per engine capability.
#[derive(Clone)]
pub struct Engines {
    pub background_remover: Arc<dyn BackgroundRemover>,
    pub html_converter: Arc<dyn HtmlConverter>,
    pub document_renderer: Arc<dyn DocumentRenderer>,
    pub pdf_rasterizer: Arc<dyn PdfRasterizer>,
}

impl Engines {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let pdf_rasterizer = create_rasterizer(config)?;

        tracing::info!(
            rasterizer = pdf_rasterizer.name(),
            rembg = %config.rembg_path,
            pandoc = %config.pandoc_path,
            chromium = %config.chromium_path,
            "Engine adapters configured"
        );

        Ok(Self {
            background_remover: Arc::new(RembgCli::new(
                config.rembg_path.clone(),
                config.rembg_model.clone(),
            )),
            html_converter: Arc::new(PandocConverter::new(config.pandoc_path.clone())),
            document_renderer: Arc::new(ChromiumRenderer::new(config.chromium_path.clone())),
            pdf_rasterizer,
        })
    }

    /// Registry with all four strategies wired to these engines.
    pub fn into_registry(self, config: &Config) -> StrategyRegistry {
        StrategyRegistry::new()
            .with(BackgroundRemoval::new(self.background_remover))
            .with(Recompression::new(config.max_image_upload_bytes))
            .with(DocumentRender::new(
                self.html_converter,
                self.document_renderer,
            ))
            .with(Rasterization::new(self.pdf_rasterizer))
    }
}

fn create_rasterizer(config: &EngineConfig) -> Result<Arc<dyn PdfRasterizer>> {
    match config.rasterizer {
        RasterizerBackend::Pdftoppm => Ok(Arc::new(PdftoppmRasterizer::new(
            config.pdftoppm_path.clone(),
            config.raster_density,
            config.raster_width,
            config.raster_height,
        ))),
        #[cfg(feature = "pdfium")]
        RasterizerBackend::Pdfium => Ok(Arc::new(crate::engines::PdfiumRasterizer::new(
            config.pdfium_library_path.as_deref(),
            config.raster_width,
            config.raster_height,
        )?)),
        #[cfg(not(feature = "pdfium"))]
        RasterizerBackend::Pdfium => Err(anyhow::anyhow!(
            "RASTERIZER=pdfium requires the `pdfium` feature"
        )),
    }
}
