//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpAppError>`. Anything that converts
//! into `TransformError` converts into `HttpAppError` and is rendered as
//! `{ "error": ..., "code": ... }` with the status its metadata describes.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use toolbite_core::{ErrorMetadata, LogLevel, TransformError};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper type for TransformError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for TransformError (external type from toolbite-core)
#[derive(Debug)]
pub struct HttpAppError(pub TransformError);

impl From<TransformError> for HttpAppError {
    fn from(err: TransformError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(TransformError::Internal(format!("{:#}", err)))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(TransformError::Validation(format!(
            "Invalid multipart body: {}",
            err.body_text()
        )))
    }
}

fn log_error(error: &TransformError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = code, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let error = &self.0;

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(error);

        // Sensitive errors carry paths and engine output; those stay in the logs.
        let details = if is_production_env() || error.is_sensitive() {
            None
        } else {
            Some(error.to_string())
        };

        let body = Json(ErrorResponse {
            error: error.client_message(),
            code: error.error_code().to_string(),
            details,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbite_core::Operation;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_from_transform_error() {
        let HttpAppError(err) = TransformError::validation("No PDF provided").into();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let response =
            HttpAppError(TransformError::validation("No Word file was uploaded.")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "No Word file was uploaded.");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_engine_error_response_hides_source() {
        let err = TransformError::engine(
            Operation::RenderDocument,
            anyhow::anyhow!("chromium crashed writing /tmp/toolbite/123/rendered.pdf"),
        );
        let response = HttpAppError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to convert document.");
        assert_eq!(body["code"], "ENGINE_ERROR");
        assert!(body.get("details").is_none());
        assert!(!body.to_string().contains("/tmp"));
    }

    #[tokio::test]
    async fn test_payload_too_large_response() {
        let err = TransformError::PayloadTooLarge {
            size: 20 * 1024 * 1024,
            max: 15 * 1024 * 1024,
        };
        let response = HttpAppError(err).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "File size exceeds maximum allowed size of 15 MB"
        );
    }

    #[tokio::test]
    async fn test_anyhow_becomes_internal() {
        let response: Response =
            HttpAppError::from(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("secret"));
    }
}
