//! Capability contracts of the external engines and their adapters.
//!
//! Strategies only see these traits. Which adapter sits behind each one is
//! decided once, when the registry is built.

use crate::pages::PageSelection;
use crate::template::PageSetup;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;

pub mod chromium;
pub mod pandoc;
pub mod pdftoppm;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod rembg;

pub use chromium::ChromiumRenderer;
pub use pandoc::PandocConverter;
pub use pdftoppm::PdftoppmRasterizer;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use rembg::RembgCli;

/// Segments the subject of a still image from its background.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a PNG whose removed background is transparent.
    async fn remove_background(&self, input: &Path) -> Result<Bytes>;
}

/// Converts a word-processor document to semantic HTML.
#[async_trait]
pub trait HtmlConverter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the HTML body. Embedded media is extracted under `media_dir`.
    async fn to_html(&self, input: &Path, media_dir: &Path) -> Result<String>;
}

/// Starts page-layout engine sessions.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Start a fresh session whose state lives under `workdir`.
    async fn open_session(&self, workdir: &Path) -> Result<Box<dyn RenderSession>>;
}

/// A live page-layout engine, owned by one request.
#[async_trait]
pub trait RenderSession: Send {
    async fn render_pdf(&mut self, html: &Path, setup: &PageSetup) -> Result<Bytes>;

    /// Tear the session down. Called exactly once, whatever `render_pdf` returned.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Renders PDF pages to `page-<n>.png` files.
#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn rasterize(&self, input: &Path, out_dir: &Path, pages: &PageSelection)
        -> Result<()>;
}

/// Run an external tool to completion and fail on a non-zero exit.
///
/// The child is killed if the returned future is dropped.
pub(crate) async fn run_tool(mut command: Command, tool: &str) -> Result<Output> {
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", tool))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("{} failed ({}): {}", tool, output.status, stderr.trim()));
    }

    Ok(output)
}
