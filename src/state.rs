use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::paths;
use crate::presets::PresetCatalog;
use crate::store::ConfigStore;

/// The shared application state.
///
/// Cloned into every handler by Axum. Nothing in here is mutated per request
/// apart from the atomic counters in [`Metrics`]; the config file itself is
/// re-read on every request.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Handle on the Claude Desktop configuration file.
    pub store: ConfigStore,
    /// Preset templates, loaded once at startup.
    pub presets: Arc<PresetCatalog>,
    pub metrics: Metrics,
}

impl AppState {
    /// Builds the state from configuration: resolves the file to edit and
    /// loads the preset catalog.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let path = paths::resolve_config_path(config.claude.config_path.as_deref())?;
        let presets = PresetCatalog::load(config.presets.path.as_deref())?;
        Ok(Self::with_parts(config, ConfigStore::new(path), presets))
    }

    pub fn with_parts(config: AppConfig, store: ConfigStore, presets: PresetCatalog) -> Self {
        Self { config: Arc::new(config), store, presets: Arc::new(presets), metrics: Metrics::new() }
    }
}
