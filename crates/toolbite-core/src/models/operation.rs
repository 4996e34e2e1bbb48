use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The four transformations the service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RemoveBackground,
    Recompress,
    RenderDocument,
    Rasterize,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::RemoveBackground,
        Operation::Recompress,
        Operation::RenderDocument,
        Operation::Rasterize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::RemoveBackground => "remove_background",
            Operation::Recompress => "recompress",
            Operation::RenderDocument => "render_document",
            Operation::Rasterize => "rasterize",
        }
    }

    /// Client-facing message when the engine behind this operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::RemoveBackground => "Background removal failed",
            Operation::Recompress => "Failed to compress image.",
            Operation::RenderDocument => "Failed to convert document.",
            Operation::Rasterize => "PDF conversion failed.",
        }
    }

    /// Client-facing message when the request carries no file.
    pub fn missing_file_message(self) -> &'static str {
        match self {
            Operation::RemoveBackground => "No image provided",
            Operation::Recompress => "No image file provided.",
            Operation::RenderDocument => "No Word file was uploaded.",
            Operation::Rasterize => "No PDF provided",
        }
    }
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remove_background" => Ok(Operation::RemoveBackground),
            "recompress" => Ok(Operation::Recompress),
            "render_document" => Ok(Operation::RenderDocument),
            "rasterize" => Ok(Operation::Rasterize),
            _ => Err(anyhow::anyhow!("Invalid operation: {}", s)),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
