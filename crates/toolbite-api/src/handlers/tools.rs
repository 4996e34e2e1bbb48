//! The four file tools.
//!
//! Every handler reads its form, hands the request to the dispatcher and
//! emits the result. Dispatch runs on its own task so a client disconnect
//! cannot abort a request halfway through its cleanup.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use std::sync::Arc;
use toolbite_core::{Operation, TransformError, TransformRequest};

use crate::constants::file_field;
use crate::emit::{PdfImagesResponse, ResultEmitter};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_upload_form;

/// Remove the background of an image
///
/// Returns the subject on a transparent background as PNG.
#[utoipa::path(
    post,
    path = "/api/remove-bg",
    tag = "tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field `image`: the picture to cut out"),
    responses(
        (status = 200, description = "Cut-out image"),
        (status = 400, description = "No image provided", body = ErrorResponse),
        (status = 500, description = "Background removal failed", body = ErrorResponse)
    )
)]
pub async fn remove_background(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    run_tool(&state, Operation::RemoveBackground, multipart).await
}

/// Recompress an image in its own format
///
/// The response is never larger than the upload: when re-encoding does not
/// shrink the file, the original bytes come back and both size headers match.
#[utoipa::path(
    post,
    path = "/api/compress-image",
    tag = "tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field `image`: JPEG, PNG, GIF or BMP. Optional field `quality`: 1-100, default 70"),
    responses(
        (status = 200, description = "Recompressed image with X-Original-Size and X-Compressed-Size headers"),
        (status = 400, description = "No image file provided or invalid quality", body = ErrorResponse),
        (status = 413, description = "Image exceeds the upload cap", body = ErrorResponse),
        (status = 500, description = "Image could not be processed", body = ErrorResponse)
    )
)]
pub async fn compress_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    run_tool(&state, Operation::Recompress, multipart).await
}

/// Convert a Word document to PDF
#[utoipa::path(
    post,
    path = "/api/word-to-pdf",
    tag = "tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field `word`: a .docx document"),
    responses(
        (status = 200, description = "A4 PDF attachment"),
        (status = 400, description = "No Word file was uploaded", body = ErrorResponse),
        (status = 500, description = "Failed to convert document", body = ErrorResponse)
    )
)]
pub async fn word_to_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    run_tool(&state, Operation::RenderDocument, multipart).await
}

/// Render PDF pages to PNG data URIs
#[utoipa::path(
    post,
    path = "/api/convert-pdf",
    tag = "tools",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Field `pdf`: the document. Optional field `pages`: `-1` for all pages (default) or a comma-separated list of 1-based page numbers"),
    responses(
        (status = 200, description = "Pages in source order", body = PdfImagesResponse),
        (status = 400, description = "No PDF provided or invalid pages", body = ErrorResponse),
        (status = 500, description = "PDF conversion failed", body = ErrorResponse)
    )
)]
pub async fn convert_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    run_tool(&state, Operation::Rasterize, multipart).await
}

#[tracing::instrument(skip(state, operation, multipart), fields(operation = %operation))]
async fn run_tool(
    state: &AppState,
    operation: Operation,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let size_cap = match operation {
        Operation::Recompress => Some(state.config.max_image_upload_bytes),
        _ => None,
    };

    let form = read_upload_form(multipart, file_field(operation), size_cap).await?;
    let request = TransformRequest::new(operation, form.file, form.options);

    let dispatcher = state.dispatcher.clone();
    let dispatched = tokio::spawn(async move { dispatcher.dispatch(request).await })
        .await
        .map_err(|e| TransformError::Internal(format!("Dispatch task failed: {}", e)))??;

    ResultEmitter::emit(dispatched)
}
