use crate::schema::MarqueeConfig;

use super::helpers::validate_range;

pub(crate) fn validate_registry(errors: &mut Vec<String>, config: &MarqueeConfig) {
    validate_range(
        errors,
        "registry.activity_window_secs",
        config.registry.activity_window_secs,
        1,
        86400,
    );
    validate_range(
        errors,
        "registry.sweep_interval_secs",
        config.registry.sweep_interval_secs,
        0,
        86400,
    );
}
