use crate::compression::{self, DEFAULT_QUALITY};
use crate::traits::{TransformStrategy, Workspace};
use async_trait::async_trait;
use toolbite_core::{Artifact, Operation, TransformError, TransformOptions, TransformResult};

pub const QUALITY_OPTION: &str = "quality";

const INVALID_FORMAT_MESSAGE: &str =
    "Could not process this image format. Please upload a valid JPG or PNG.";

/// Parse the quality option with integer-prefix semantics.
///
/// Missing, empty or non-numeric input gives the default. A number outside
/// 1-100 is rejected.
pub fn parse_quality(raw: Option<&str>) -> Result<u8, TransformError> {
    let raw = raw.unwrap_or("").trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return Ok(DEFAULT_QUALITY);
    }

    digits
        .parse::<u64>()
        .ok()
        .filter(|value| !negative && (1..=100).contains(value))
        .map(|value| value as u8)
        .ok_or_else(|| TransformError::validation("Quality must be an integer between 1 and 100"))
}

/// In-memory re-encode within the input's format family.
pub struct Recompression {
    max_payload_bytes: usize,
}

impl Recompression {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }
}

#[async_trait]
impl TransformStrategy for Recompression {
    fn operation(&self) -> Operation {
        Operation::Recompress
    }

    fn max_payload_bytes(&self) -> Option<usize> {
        Some(self.max_payload_bytes)
    }

    fn validate_options(&self, options: &TransformOptions) -> Result<(), TransformError> {
        parse_quality(options.get(QUALITY_OPTION)).map(|_| ())
    }

    async fn transform(&self, workspace: &Workspace) -> Result<TransformResult, TransformError> {
        let quality = parse_quality(workspace.options.get(QUALITY_OPTION))?;
        let data = workspace.payload.bytes().clone();

        let outcome = tokio::task::spawn_blocking(move || compression::recompress(&data, quality))
            .await
            .map_err(|e| TransformError::Internal(format!("Compression task failed: {}", e)))?
            .map_err(|e| {
                let message = if e.is_input_error() {
                    INVALID_FORMAT_MESSAGE
                } else {
                    Operation::Recompress.failure_message()
                };
                TransformError::engine_with_message(Operation::Recompress, message, e)
            })?;

        tracing::debug!(
            request_id = %workspace.request_id,
            quality = quality,
            format = outcome.family.mime_type(),
            original_size = outcome.original_size,
            compressed_size = outcome.compressed_size,
            kept_original = outcome.kept_original,
            "Image recompressed"
        );

        Ok(TransformResult::Single(Artifact::new(
            outcome.bytes,
            outcome.family.mime_type(),
        )))
    }
}
