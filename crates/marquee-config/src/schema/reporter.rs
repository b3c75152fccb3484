//! Presence reporter configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Base URL of the registry server.
    pub server_url: String,
    /// Seconds between presence reports.
    pub interval_secs: u64,
    pub cookie_name: String,
    /// Lifetime of a freshly issued visitor cookie.
    pub cookie_ttl_hours: u64,
    /// Cookie jar location. `None` uses the platform data directory.
    pub cookie_jar: Option<PathBuf>,
    /// Per-request timeout in seconds. 0 keeps the HTTP client default.
    pub request_timeout_secs: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            interval_secs: 60,
            cookie_name: "visitor_id".into(),
            cookie_ttl_hours: 24,
            cookie_jar: None,
            request_timeout_secs: 0,
        }
    }
}
