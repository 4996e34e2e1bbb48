//! Route prefixes and multipart field names.

use toolbite_core::Operation;

/// Prefix every tool route is mounted under.
pub const API_PREFIX: &str = "/api";

pub const REMOVE_BG_PATH: &str = "/remove-bg";
pub const COMPRESS_IMAGE_PATH: &str = "/compress-image";
pub const WORD_TO_PDF_PATH: &str = "/word-to-pdf";
pub const CONVERT_PDF_PATH: &str = "/convert-pdf";

pub const HEADER_ORIGINAL_SIZE: &str = "x-original-size";
pub const HEADER_COMPRESSED_SIZE: &str = "x-compressed-size";

/// Multipart overhead allowed on top of the in-memory image cap.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Name of the multipart field carrying the upload for an operation.
pub fn file_field(operation: Operation) -> &'static str {
    match operation {
        Operation::RemoveBackground | Operation::Recompress => "image",
        Operation::RenderDocument => "word",
        Operation::Rasterize => "pdf",
    }
}
