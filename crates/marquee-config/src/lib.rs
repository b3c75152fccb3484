//! Marquee configuration system.
//!
//! One TOML file configures both the registry server and the presence
//! reporter. Every section has defaults, so a partial file (or no file at
//! all) works out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use marquee_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod logging;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    Consistency, LogLevel, LoggingConfig, MarqueeConfig, RegistryConfig, ReporterConfig, ServerConfig,
    StoreBackend, StoreConfig, CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use marquee_common::ConfigError;

/// Load config from `path`, or from the platform default path when `None`.
///
/// The default path gets a commented template written on first use. The
/// loaded config must pass [`validation::validate`].
pub fn load_config(path: Option<&Path>) -> Result<MarqueeConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            toml_loader::load_from_path(path)?
        }
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &MarqueeConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
