use anyhow::{Context, Result};
use toolbite_core::Config;
use toolbite_processing::{Engines, StrategyRegistry};

/// Build the configured engine adapters and register one strategy per operation.
pub fn setup_registry(config: &Config) -> Result<StrategyRegistry> {
    let registry = Engines::from_config(&config.engines)
        .context("Failed to configure transformation engines")?
        .into_registry(config);

    tracing::info!(operations = registry.len(), "Strategy registry ready");

    Ok(registry)
}
