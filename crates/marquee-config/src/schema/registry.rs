use serde::{Deserialize, Serialize};

/// Presence registry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Entries older than this many seconds are swept (valid range: 1-86400).
    pub activity_window_secs: u64,
    /// Period of the background sweeper in seconds. 0 disables it; the
    /// per-request sweep always runs.
    pub sweep_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            activity_window_secs: 30,
            sweep_interval_secs: 0,
        }
    }
}
