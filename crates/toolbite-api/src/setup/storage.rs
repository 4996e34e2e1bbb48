use anyhow::{Context, Result};
use toolbite_core::Config;
use toolbite_storage::{EphemeralStore, EphemeralStoreConfig};

/// Create the ephemeral store and clear anything a previous run left behind.
pub async fn setup_store(config: &Config) -> Result<EphemeralStore> {
    let store = EphemeralStore::new(EphemeralStoreConfig::new(&config.temp_dir))
        .await
        .context("Failed to initialize ephemeral store")?;

    if let Err(e) = store.purge_stale().await {
        tracing::warn!(error = %e, "Failed to purge stale temporary entries");
    }

    Ok(store)
}
