//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::emit;
use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ToolBite API",
        version = "0.1.0",
        description = "Stateless file tools: background removal, image recompression, Word to PDF and PDF to PNG. Nothing uploaded is kept once the response is sent."
    ),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::tools::remove_background,
        handlers::tools::compress_image,
        handlers::tools::word_to_pdf,
        handlers::tools::convert_pdf,
    ),
    components(schemas(
        error::ErrorResponse,
        emit::PdfImagesResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "tools", description = "File transformation endpoints"),
        (name = "health", description = "Service status"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_tool() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/remove-bg",
            "/api/compress-image",
            "/api/word-to-pdf",
            "/api/convert-pdf",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
