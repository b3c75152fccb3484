//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use crate::schema::{Consistency, StoreBackend};
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_parse_error() {
    let result = load_from_path(Path::new("/tmp/nonexistent_marquee_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, marquee_common::ConfigError::ParseError(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 8081

[store]
backend = "sqlite"
database_url = "sqlite::memory:"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.database_url, "sqlite::memory:");
    // Defaults preserved
    assert_eq!(config.server.client_ip_header, "x-real-ip");
    assert_eq!(config.store.consistency, Consistency::Atomic);
    assert_eq!(config.registry.activity_window_secs, 30);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, marquee_common::ConfigError::ParseError(_)));
}

#[test]
fn load_with_invalid_values_returns_parsed_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[reporter]\ninterval_secs = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.reporter.interval_secs, 0);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("marquee").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.reporter.interval_secs, 60);
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_paths_live_under_marquee_dir() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("marquee/config.toml"));
    }
    if let Ok(path) = default_cookie_jar_path() {
        assert!(path.ends_with("marquee/cookies.json"));
    }
}
