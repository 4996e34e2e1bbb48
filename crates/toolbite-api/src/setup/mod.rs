//! Application setup and initialization

pub mod engines;
pub mod routes;
pub mod server;
pub mod storage;

use anyhow::{Context, Result};
use toolbite_core::Config;
use toolbite_processing::Dispatcher;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<axum::Router> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let store = storage::setup_store(config).await?;
    let registry = engines::setup_registry(config)?;

    let dispatcher = Dispatcher::new(registry, store);

    routes::setup_routes(config, dispatcher)
}
