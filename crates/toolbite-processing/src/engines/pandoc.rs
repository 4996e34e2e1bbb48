//! DOCX to HTML through pandoc.

use super::{run_tool, HtmlConverter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct PandocConverter {
    pandoc_path: String,
}

impl PandocConverter {
    pub fn new(pandoc_path: impl Into<String>) -> Self {
        Self {
            pandoc_path: pandoc_path.into(),
        }
    }

    fn command(&self, input: &Path, media_dir: &Path) -> Command {
        let mut command = Command::new(&self.pandoc_path);
        command
            .arg("--from=docx")
            .arg("--to=html5")
            .arg(format!("--extract-media={}", media_dir.display()))
            .arg(input);
        command
    }
}

#[async_trait]
impl HtmlConverter for PandocConverter {
    fn name(&self) -> &'static str {
        "pandoc"
    }

    async fn to_html(&self, input: &Path, media_dir: &Path) -> Result<String> {
        let output = run_tool(self.command(input, media_dir), "pandoc").await?;
        String::from_utf8(output.stdout).context("pandoc produced invalid UTF-8")
    }
}
