//! Headless Chromium as the page-layout engine.
//!
//! A session owns a private browser profile directory. Each render runs the
//! browser in print-to-PDF mode against that profile; closing the session
//! removes the profile. Page size and margins come from the document's
//! `@page` rule, so the session does not pass them on the command line.

use super::{run_tool, DocumentRenderer, RenderSession};
use crate::template::PageSetup;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use url::Url;

const PROFILE_DIR: &str = "chromium-profile";
const OUTPUT_FILE: &str = "rendered.pdf";
const PDF_SIGNATURE: &[u8] = b"%PDF";

#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    chromium_path: String,
}

impl ChromiumRenderer {
    pub fn new(chromium_path: impl Into<String>) -> Self {
        Self {
            chromium_path: chromium_path.into(),
        }
    }
}

#[async_trait]
impl DocumentRenderer for ChromiumRenderer {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn open_session(&self, workdir: &Path) -> Result<Box<dyn RenderSession>> {
        let profile_dir = workdir.join(PROFILE_DIR);
        tokio::fs::create_dir(&profile_dir)
            .await
            .with_context(|| format!("Failed to create browser profile {}", profile_dir.display()))?;

        tracing::debug!(profile = %profile_dir.display(), "Chromium session opened");

        Ok(Box::new(ChromiumSession {
            chromium_path: self.chromium_path.clone(),
            output_path: workdir.join(OUTPUT_FILE),
            profile_dir,
            closed: false,
        }))
    }
}

struct ChromiumSession {
    chromium_path: String,
    profile_dir: PathBuf,
    output_path: PathBuf,
    closed: bool,
}

impl ChromiumSession {
    fn command(&self, html: &Path) -> Result<Command> {
        let page_url = Url::from_file_path(html)
            .map_err(|_| anyhow!("{} is not an absolute path", html.display()))?;

        let mut command = Command::new(&self.chromium_path);
        command
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--no-pdf-header-footer")
            .arg(format!("--user-data-dir={}", self.profile_dir.display()))
            .arg(format!("--print-to-pdf={}", self.output_path.display()))
            .arg(page_url.as_str());
        Ok(command)
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render_pdf(&mut self, html: &Path, setup: &PageSetup) -> Result<Bytes> {
        if self.closed {
            return Err(anyhow!("render session already closed"));
        }

        tracing::debug!(
            html = %html.display(),
            page = %setup,
            "Rendering document with chromium"
        );

        run_tool(self.command(html)?, "chromium").await?;

        let pdf = tokio::fs::read(&self.output_path)
            .await
            .context("chromium did not write a PDF")?;

        if !pdf.starts_with(PDF_SIGNATURE) {
            return Err(anyhow!("chromium output is not a PDF"));
        }

        Ok(Bytes::from(pdf))
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.closed = true;
        match tokio::fs::remove_dir_all(&self.profile_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove browser profile"),
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if !self.closed {
            let _ = std::fs::remove_dir_all(&self.profile_dir);
        }
    }
}
