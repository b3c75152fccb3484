//! Server and store validation.

use crate::schema::{MarqueeConfig, StoreBackend};

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &MarqueeConfig) {
    let server = &config.server;
    validate_non_empty(errors, "server.host", &server.host);
    validate_range(errors, "server.port", u64::from(server.port), 1, 65535);
    validate_non_empty(errors, "server.client_ip_header", &server.client_ip_header);

    if !server.client_ip_header.is_empty()
        && !server
            .client_ip_header
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        errors.push(format!(
            "server.client_ip_header = {:?} is not a valid header name",
            server.client_ip_header
        ));
    }

    for origin in &server.cors_allowed_origins {
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            errors.push(format!(
                "server.cors_allowed_origins entry {origin:?} must start with http:// or https://"
            ));
        }
    }
}

pub(crate) fn validate_store(errors: &mut Vec<String>, config: &MarqueeConfig) {
    if config.store.backend == StoreBackend::Sqlite {
        validate_non_empty(errors, "store.database_url", &config.store.database_url);
        if !config.store.database_url.starts_with("sqlite:") {
            errors.push(format!(
                "store.database_url = {:?} must be a sqlite: URL",
                config.store.database_url
            ));
        }
    }
}
