//! Core TOML config loading: read from path or platform default.

use crate::schema::MarqueeConfig;
use crate::validation;
use marquee_common::ConfigError;
use std::path::Path;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path};

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. Validation failures are only
/// logged here; callers that must not run with bad values call
/// [`validation::validate`] themselves.
pub fn load_from_path(path: &Path) -> Result<MarqueeConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: MarqueeConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/marquee/config.toml`
///
/// If the file does not exist, writes the commented template there and
/// returns defaults. A template that cannot be written is only logged.
pub fn load_default() -> Result<MarqueeConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        if let Err(e) = create_default_config(&path) {
            warn!("could not write default config: {e}");
        }
        return Ok(MarqueeConfig::default());
    }

    load_from_path(&path)
}
