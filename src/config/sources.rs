use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "SMARTCATALOG_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/smartcatalog.toml";
const ENV_PREFIX: &str = "SMARTCATALOG";
const ENV_SEPARATOR: &str = "__";
const API_KEY_ENV_VAR: &str = "SMARTCATALOG_API_KEY";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_with_secrets(config_path)
}

/// Same as [`load`] for an explicit file path, secrets included
pub fn load_with_secrets(config_path: PathBuf) -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);

    Ok(config)
}

/// The API key only ever comes from the process environment
fn load_secrets(config: &mut Config) {
    match env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => config.service.api_key = Some(key),
        _ => tracing::warn!(
            "{} is not set, catalog requests will be sent without credentials",
            API_KEY_ENV_VAR
        ),
    }
}

/// Load configuration from a specific path and environment, without secrets
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // SMARTCATALOG__SERVICE__BASE_URL -> service.base_url
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
