//! In-process PDF rasterization with pdfium.

use super::PdfRasterizer;
use crate::pages::{page_file_name, PageSelection};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

/// Where the pdfium shared library is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PdfiumLibrary {
    Directory(PathBuf),
    System,
}

impl PdfiumLibrary {
    fn bind(&self) -> Result<Pdfium> {
        let bindings = match self {
            PdfiumLibrary::Directory(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            PdfiumLibrary::System => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| anyhow!("Failed to bind pdfium: {:?}", e))?;

        Ok(Pdfium::new(bindings))
    }
}

#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library: PdfiumLibrary,
    width: u32,
    height: u32,
}

impl PdfiumRasterizer {
    /// Resolve the library once: the configured directory if it binds,
    /// otherwise the system library.
    pub fn new(library_dir: Option<&Path>, width: u32, height: u32) -> Result<Self> {
        let library = match library_dir {
            Some(dir) => {
                let candidate = PdfiumLibrary::Directory(dir.to_path_buf());
                match candidate.bind() {
                    Ok(_) => candidate,
                    Err(e) => {
                        tracing::warn!(
                            path = %dir.display(),
                            error = %e,
                            "pdfium not found at configured path, falling back to system library"
                        );
                        PdfiumLibrary::System
                    }
                }
            }
            None => PdfiumLibrary::System,
        };

        if library == PdfiumLibrary::System {
            library.bind().context("pdfium library is not available")?;
        }

        Ok(Self {
            library,
            width,
            height,
        })
    }

    fn rasterize_blocking(&self, input: &Path, out_dir: &Path, selection: &PageSelection) -> Result<()> {
        let pdfium = self.library.bind()?;
        let document = pdfium
            .load_pdf_from_file(input, None)
            .map_err(|e| anyhow!("Failed to open PDF: {:?}", e))?;

        let pages = document.pages();
        let total = pages.len() as u32;
        let selected: Vec<u32> = match selection {
            PageSelection::All => (1..=total).collect(),
            PageSelection::Pages(pages) => pages.clone(),
        };

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.width as i32)
            .set_maximum_height(self.height as i32);

        for page_number in selected {
            if page_number > total {
                return Err(anyhow!("page {} out of range (total {})", page_number, total));
            }

            let page = pages
                .get((page_number - 1) as u16)
                .map_err(|e| anyhow!("Failed to load page {}: {:?}", page_number, e))?;
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| anyhow!("Failed to render page {}: {:?}", page_number, e))?;

            bitmap
                .as_image()
                .save_with_format(out_dir.join(page_file_name(page_number)), ImageFormat::Png)
                .with_context(|| format!("Failed to write page {}", page_number))?;
        }

        Ok(())
    }
}

#[async_trait]
impl PdfRasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    async fn rasterize(&self, input: &Path, out_dir: &Path, pages: &PageSelection) -> Result<()> {
        let rasterizer = self.clone();
        let input = input.to_path_buf();
        let out_dir = out_dir.to_path_buf();
        let pages = pages.clone();

        tokio::task::spawn_blocking(move || rasterizer.rasterize_blocking(&input, &out_dir, &pages))
            .await
            .map_err(|e| anyhow!("pdfium task panicked: {}", e))?
    }
}
