//! Configuration management for the SmartCatalog client
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use smartcatalog::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Catalog endpoint: {}", config.service.catalog_url());
//! ```
//!
//! # Environment Variables
//!
//! Overrides use the pattern `SMARTCATALOG__<section>__<key>`:
//! - `SMARTCATALOG__SERVICE__BASE_URL=https://catalog.example.com`
//! - `SMARTCATALOG__SELECTION__MAX_FILE_BYTES=10MB`
//!
//! The service credential is read from `SMARTCATALOG_API_KEY` only. It is
//! never accepted from the configuration file.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/smartcatalog.toml`.
//! This can be overridden using the `SMARTCATALOG_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, SelectionConfig, ServiceConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
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
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// fails validation (bad URL, empty allow-list, zero limits).
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, secrets included
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_with_secrets(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
