//! # portal-config
//!
//! Layered configuration loading for the portal search engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PORTAL_*` prefix, `__` as separator)
//! 2. Project-level `.portal/config.toml`
//! 3. User-level `~/.config/portal/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PORTAL_CACHE__CAPACITY` -> `cache.capacity`,
//! `PORTAL_SEARCH__MAX_RESULTS_PER_TYPE` -> `search.max_results_per_type`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use portal_config::PortalConfig;
//!
//! let config = PortalConfig::load_with_dotenv().expect("config");
//! println!("child cache holds {} entries", config.cache.capacity);
//! ```

mod cache;
mod error;
mod search;

pub use cache::ChildCacheConfig;
pub use error::ConfigError;
pub use search::SearchConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PortalConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cache: ChildCacheConfig,
}

impl PortalConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".portal/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("PORTAL_").split("__"))
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        self.cache.validate()
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("portal").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PortalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_results_per_type, 5000);
        assert_eq!(config.cache.capacity, 30_000);
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = PortalConfig::figment();
        let config: PortalConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.search.individual_batch_size, 10);
    }
}
