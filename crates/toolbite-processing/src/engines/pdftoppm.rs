//! PDF rasterization through poppler's `pdftoppm`.

use super::{run_tool, PdfRasterizer};
use crate::pages::{PageSelection, PAGE_FILE_PREFIX};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// `pdftoppm` names its files `page-<n>.png`, zero-padding `<n>` to the
/// width of the page count.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    pdftoppm_path: String,
    density: u32,
    width: u32,
    height: u32,
}

impl PdftoppmRasterizer {
    pub fn new(pdftoppm_path: impl Into<String>, density: u32, width: u32, height: u32) -> Self {
        Self {
            pdftoppm_path: pdftoppm_path.into(),
            density,
            width,
            height,
        }
    }

    fn command(&self, input: &Path, out_dir: &Path, range: Option<(u32, u32)>) -> Command {
        let mut command = Command::new(&self.pdftoppm_path);
        command
            .arg("-png")
            .args(["-r", &self.density.to_string()])
            .args(["-scale-to-x", &self.width.to_string()])
            .args(["-scale-to-y", &self.height.to_string()]);

        if let Some((first, last)) = range {
            command
                .args(["-f", &first.to_string()])
                .args(["-l", &last.to_string()]);
        }

        command
            .arg(input)
            .arg(out_dir.join(PAGE_FILE_PREFIX.trim_end_matches('-')));
        command
    }
}

#[async_trait]
impl PdfRasterizer for PdftoppmRasterizer {
    fn name(&self) -> &'static str {
        "pdftoppm"
    }

    async fn rasterize(&self, input: &Path, out_dir: &Path, pages: &PageSelection) -> Result<()> {
        match pages {
            PageSelection::All => {
                run_tool(self.command(input, out_dir, None), "pdftoppm").await?;
            }
            PageSelection::Pages(pages) => {
                for &page in pages {
                    run_tool(self.command(input, out_dir, Some((page, page))), "pdftoppm").await?;
                }
            }
        }
        Ok(())
    }
}
