use anyhow::Result;
use mimalloc::MiMalloc;
use toolbite_api::setup::{initialize_app, server};
use toolbite_core::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let app = initialize_app(&config).await?;

    server::start_server(&config, app).await
}
