use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Registered operations, by name.
    pub operations: Vec<String>,
    /// Ephemeral storage handles currently allocated.
    pub live_handles: usize,
}

/// Liveness banner
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service banner", body = String))
)]
pub async fn root() -> &'static str {
    "ToolBite API is online"
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let dispatcher = &state.dispatcher;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        operations: dispatcher
            .registry()
            .operations()
            .into_iter()
            .map(|op| op.as_str().to_string())
            .collect(),
        live_handles: dispatcher.store().live_handles(),
    })
}
