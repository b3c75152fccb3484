//! Presence store selection.

use serde::{Deserialize, Serialize};

/// Which backend holds presence entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map. Lost on restart.
    #[default]
    Memory,
    /// SQLite database through sqlx.
    Sqlite,
}

/// How the sweep, lookup-or-insert and count steps of a report relate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// All steps run as one transaction.
    #[default]
    Atomic,
    /// Each step is its own store call. Concurrent first reports for the
    /// same visitor may race; the loser's duplicate insert is ignored.
    Stepwise,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// sqlx connection URL, used by the `sqlite` backend.
    pub database_url: String,
    pub consistency: Consistency,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: "sqlite://marquee.db".into(),
            consistency: Consistency::Atomic,
        }
    }
}
