//! Presence store: one entry per visitor id, expired by age.
//!
//! Every method is individually atomic. `record_atomic` additionally runs
//! the whole sweep/lookup-or-insert/count sequence as a single unit.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_common::{StoreError, VisitorId};
use marquee_config::{StoreBackend, StoreConfig};

/// A visitor's recorded presence. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub id: VisitorId,
    pub ip: String,
    pub timestamp: DateTime<Utc>,
}

impl PresenceEntry {
    pub fn new(id: VisitorId, ip: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            ip: ip.into(),
            timestamp,
        }
    }
}

#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Remove every entry with `timestamp < cutoff`. Returns how many were removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    async fn find_by_id(&self, id: VisitorId) -> Result<Option<PresenceEntry>, StoreError>;

    /// Insert a new entry. Fails with [`StoreError::Duplicate`] when the id
    /// is already present; the existing entry is left untouched.
    async fn insert(&self, entry: &PresenceEntry) -> Result<(), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Sweep entries older than `cutoff`, insert `entry` unless its id is
    /// already present, and return the resulting count, all in one unit.
    async fn record_atomic(
        &self,
        entry: &PresenceEntry,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Release the backend. Later calls fail with [`StoreError::Closed`].
    async fn close(&self);
}

/// Open the backend selected by `config`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn PresenceStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory presence store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Sqlite => {
            let store = SqliteStore::connect(&config.database_url).await?;
            tracing::info!(url = %config.database_url, "Using SQLite presence store");
            Ok(Arc::new(store))
        }
    }
}
