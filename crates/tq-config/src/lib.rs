//! # tq-config
//!
//! Layered configuration loading for twentyq using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TQ_*` prefix, `__` as separator)
//! 2. Project-level `.twentyq/config.toml`
//! 3. User-level `~/.config/twentyq/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `TQ_STORE__DATA_DIR` -> `store.data_dir`,
//! `TQ_GENERAL__DEFAULT_LIMIT` -> `general.default_limit`, etc.
//!
//! Game policy (confidence threshold, guess attempts) is fixed in the engine
//! and deliberately absent here.
//!
//! ```no_run
//! use tq_config::TqConfig;
//!
//! let config = TqConfig::load_with_dotenv().expect("config");
//! println!("snapshot file: {}", config.store.snapshot_file);
//! ```

mod error;
mod general;
mod store;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::{IN_MEMORY, StoreConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name of the project-local data and config directory.
pub const PROJECT_DIR: &str = ".twentyq";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TqConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl TqConfig {
    /// Load configuration from all sources, using the current directory as
    /// the project root.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(Path::new("."))
    }

    /// Load configuration for the project rooted at `root`.
    pub fn load_for(root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(root).extract()?;
        config.store.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the provider chain rooted at the current directory.
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the provider chain for the project rooted at `root`.
    ///
    /// Public so tests can inspect the figment or stack extra providers on it.
    pub fn figment_for(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = Self::project_config_path(root);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TQ_").split("__"))
    }

    /// `<root>/.twentyq/config.toml`.
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_DIR).join("config.toml")
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("twentyq").join("config.toml"))
    }

    /// Serialize as the TOML written by `tq init`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            reason: e.to_string(),
        })
    }
}
