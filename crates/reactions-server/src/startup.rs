//! Startup helpers: configuration loading and state construction.
//!
//! The binary calls [`load_config`] then [`build_state`]; tests and
//! embedders can call [`build_state`] with a config built in code.

use std::path::Path;
use std::sync::Arc;

use reactions_core::{ConfigError, EmojiPolicy, ReactionService, ReactionsConfig, StoreBackend};
use reactions_db::{DbError, ReactionStore};
use tracing::info;

use crate::server::ServerError;
use crate::state::AppState;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "reactions-config.yaml";

/// Errors that can occur while bringing the server up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The storage backend could not be reached.
    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Load configuration from `path`.
///
/// A missing file is not an error: defaults are used and environment
/// overrides still apply.
///
/// # Errors
///
/// Returns [`StartupError::Config`] if the file exists but is unreadable
/// or invalid, or if an environment override is malformed.
pub fn load_config(path: &Path) -> Result<ReactionsConfig, StartupError> {
    if path.exists() {
        Ok(ReactionsConfig::from_file(path)?)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        let mut config = ReactionsConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}

/// Connect the configured store and wrap it in application state.
///
/// # Errors
///
/// Returns [`StartupError::Store`] if the `Dragonfly` backend is selected
/// and cannot be reached.
pub async fn build_state(config: &ReactionsConfig) -> Result<Arc<AppState>, StartupError> {
    let store = match config.store.backend {
        StoreBackend::Memory => ReactionStore::memory(),
        StoreBackend::Dragonfly => {
            info!(url = %config.store.dragonfly_url, "Connecting to Dragonfly");
            ReactionStore::dragonfly(&config.store.dragonfly_url).await?
        }
    };
    let policy = Arc::new(EmojiPolicy::from_config(&config.reactions));
    info!(
        store = store.name(),
        allowed = policy.symbols().len(),
        "Reaction service ready"
    );
    Ok(Arc::new(AppState::new(ReactionService::new(store, policy))))
}
