//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod registry;
mod reporter;
mod server;


use crate::schema::MarqueeConfig;
use marquee_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MarqueeConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    server::validate_server(&mut errors, config);
    server::validate_store(&mut errors, config);
    registry::validate_registry(&mut errors, config);
    reporter::validate_reporter(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
