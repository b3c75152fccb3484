use crate::schema::MarqueeConfig;

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_reporter(errors: &mut Vec<String>, config: &MarqueeConfig) {
    let reporter = &config.reporter;

    if !(reporter.server_url.starts_with("http://") || reporter.server_url.starts_with("https://"))
    {
        errors.push(format!(
            "reporter.server_url = {:?} must start with http:// or https://",
            reporter.server_url
        ));
    }
    validate_range(errors, "reporter.interval_secs", reporter.interval_secs, 1, 86400);
    validate_non_empty(errors, "reporter.cookie_name", &reporter.cookie_name);
    if reporter
        .cookie_name
        .chars()
        .any(|c| c.is_whitespace() || c == '=' || c == ';')
    {
        errors.push(format!(
            "reporter.cookie_name = {:?} contains forbidden characters",
            reporter.cookie_name
        ));
    }
    validate_range(errors, "reporter.cookie_ttl_hours", reporter.cookie_ttl_hours, 1, 8760);
    validate_range(
        errors,
        "reporter.request_timeout_secs",
        reporter.request_timeout_secs,
        0,
        300,
    );
}
