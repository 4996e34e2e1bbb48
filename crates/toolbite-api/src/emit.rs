//! Turns a dispatched result into the HTTP response for its operation.
//!
//! Storage has already been released when a result reaches the emitter; every
//! artifact is owned bytes, so nothing here touches the filesystem.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use toolbite_core::{Artifact, Operation, TransformError, TransformResult};
use toolbite_processing::{Dispatched, LifecycleState};
use utoipa::ToSchema;

use crate::constants::{HEADER_COMPRESSED_SIZE, HEADER_ORIGINAL_SIZE};
use crate::error::HttpAppError;

/// Rendered pages of a PDF, in source page order.
#[derive(Debug, Serialize, ToSchema)]
pub struct PdfImagesResponse {
    /// One `data:image/png;base64,...` URI per page.
    pub images: Vec<String>,
}

pub struct ResultEmitter;

impl ResultEmitter {
    /// Build the response for a successful dispatch and mark the request responded.
    pub fn emit(dispatched: Dispatched) -> Result<Response, HttpAppError> {
        let Dispatched {
            request_id,
            operation,
            payload,
            result,
            mut lifecycle,
        } = dispatched;

        let response = match (operation, result) {
            (Operation::RemoveBackground, TransformResult::Single(artifact)) => {
                binary_response(artifact, &[])?
            }
            (Operation::Recompress, TransformResult::Single(artifact)) => {
                let original_size = payload.size_bytes.to_string();
                let compressed_size = artifact.len().to_string();
                let disposition =
                    format!("attachment; filename=\"compressed_{}\"", payload.original_name);

                binary_response(
                    artifact,
                    &[
                        (header::CONTENT_DISPOSITION.as_str(), disposition),
                        (HEADER_ORIGINAL_SIZE, original_size),
                        (HEADER_COMPRESSED_SIZE, compressed_size),
                    ],
                )?
            }
            (Operation::RenderDocument, TransformResult::Single(artifact)) => binary_response(
                artifact,
                &[(
                    header::CONTENT_DISPOSITION.as_str(),
                    "attachment; filename=\"converted.pdf\"".to_string(),
                )],
            )?,
            (Operation::Rasterize, TransformResult::Sequence(pages)) => {
                let images = pages.iter().map(data_uri).collect();
                Json(PdfImagesResponse { images }).into_response()
            }
            (operation, result) => {
                return Err(TransformError::Internal(format!(
                    "{} produced an unexpected result shape ({} artifacts)",
                    operation,
                    result.artifact_count()
                ))
                .into());
            }
        };

        lifecycle.advance(LifecycleState::Responded)?;

        tracing::debug!(
            request_id = %request_id,
            operation = %operation,
            elapsed_ms = lifecycle.elapsed().as_millis() as u64,
            "Response emitted"
        );

        Ok(response)
    }
}

fn binary_response(
    artifact: Artifact,
    headers: &[(&str, String)],
) -> Result<Response, HttpAppError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.mime_type.as_str())
        .header(header::CONTENT_LENGTH, artifact.len());

    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }

    builder.body(Body::from(artifact.bytes)).map_err(|e| {
        tracing::error!(error = %e, "Failed to build response");
        HttpAppError(TransformError::Internal(e.to_string()))
    })
}

fn data_uri(artifact: &Artifact) -> String {
    format!(
        "data:{};base64,{}",
        artifact.mime_type,
        STANDARD.encode(&artifact.bytes)
    )
}
