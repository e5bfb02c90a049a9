//! Configuration management for linkembed
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use linkembed::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Provider timeout: {}", config.http.timeout);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `LINKEMBED__<section>__<key>`
//!
//! Examples:
//! - `LINKEMBED__HTTP__TIMEOUT=5s`
//! - `LINKEMBED__RENDER__URLIZE_ALL=false`
//! - `LINKEMBED__CACHE__BACKEND=fjall`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/linkembed.toml`.
//! This can be overridden using the `LINKEMBED_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    BlockHandlerMode, BootstrapSource, CacheBackend, CacheConfig, Config, CustomProvider,
    HttpSettings, ProvidersConfig, RenderSettings,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`LINKEMBED__*`)
    /// 2. TOML file (default: `config/linkembed.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (zero timeout, bad custom pattern, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
