//! Reactions server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `reactions-config.yaml` (or the path in
//!    `REACTIONS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the configured store
//! 4. Serve HTTP until `Ctrl-C`
//! 5. Close the store connection

use std::path::PathBuf;
use std::sync::Arc;

use reactions_server::startup::DEFAULT_CONFIG_PATH;
use reactions_server::{build_state, load_config, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("REACTIONS_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config(&config_path)?;

    let level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        backend = ?config.store.backend,
        host = config.server.host,
        port = config.server.port,
        "reactions-server starting"
    );

    let state = build_state(&config).await?;
    start_server(&config.server, Arc::clone(&state)).await?;
    state.service.store().close().await?;

    info!("reactions-server exited cleanly");
    Ok(())
}
