//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{
    API_PREFIX, COMPRESS_IMAGE_PATH, CONVERT_PDF_PATH, HEADER_COMPRESSED_SIZE,
    HEADER_ORIGINAL_SIZE, MULTIPART_OVERHEAD_BYTES, REMOVE_BG_PATH, WORD_TO_PDF_PATH,
};
use crate::handlers;
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use toolbite_core::Config;
use toolbite_processing::Dispatcher;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Build the full application router.
pub fn setup_routes(config: &Config, dispatcher: Dispatcher) -> Result<Router> {
    let cors = setup_cors(config)?;
    let state = Arc::new(AppState::new(config.clone(), dispatcher));

    let app = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .nest(API_PREFIX, tool_routes(config))
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// The four tool endpoints.
///
/// Only the image recompression route is size-limited. The others accept any
/// size: the upload is buffered in memory, then the dispatcher stages it into
/// ephemeral storage for the engine.
fn tool_routes(config: &Config) -> Router<Arc<AppState>> {
    let image_limit = config
        .max_image_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(REMOVE_BG_PATH, post(handlers::tools::remove_background))
        .route(
            COMPRESS_IMAGE_PATH,
            post(handlers::tools::compress_image).layer(DefaultBodyLimit::max(image_limit)),
        )
        .route(WORD_TO_PDF_PATH, post(handlers::tools::word_to_pdf))
        .route(CONVERT_PDF_PATH, post(handlers::tools::convert_pdf))
        .layer(DefaultBodyLimit::disable())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let exposed = [
        HeaderName::from_static(HEADER_ORIGINAL_SIZE),
        HeaderName::from_static(HEADER_COMPRESSED_SIZE),
    ];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(exposed)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(exposed)
    };

    Ok(cors)
}
