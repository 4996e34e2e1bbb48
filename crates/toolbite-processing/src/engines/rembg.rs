//! Background removal through the `rembg` command line tool.

use super::{run_tool, BackgroundRemover};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use tokio::process::Command;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Runs `rembg i [-m <model>] <input> -` and reads the PNG from stdout.
#[derive(Debug, Clone)]
pub struct RembgCli {
    rembg_path: String,
    model: Option<String>,
}

impl RembgCli {
    pub fn new(rembg_path: impl Into<String>, model: Option<String>) -> Self {
        Self {
            rembg_path: rembg_path.into(),
            model,
        }
    }

    fn command(&self, input: &Path) -> Command {
        let mut command = Command::new(&self.rembg_path);
        command.arg("i");
        if let Some(model) = &self.model {
            command.args(["-m", model]);
        }
        command.arg(input).arg("-");
        command
    }
}

#[async_trait]
impl BackgroundRemover for RembgCli {
    fn name(&self) -> &'static str {
        "rembg"
    }

    async fn remove_background(&self, input: &Path) -> Result<Bytes> {
        let output = run_tool(self.command(input), "rembg").await?;

        if !output.stdout.starts_with(PNG_SIGNATURE) {
            return Err(anyhow!(
                "rembg produced {} bytes that are not a PNG image",
                output.stdout.len()
            ));
        }

        Ok(Bytes::from(output.stdout))
    }
}
