//! In-process presence store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_common::{StoreError, VisitorId};
use tokio::sync::RwLock;

use super::{PresenceEntry, PresenceStore};

/// Thread-safe map of visitor id to entry. `None` once closed.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<Option<HashMap<VisitorId, PresenceEntry>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Some(HashMap::new()))),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sweep(map: &mut HashMap<VisitorId, PresenceEntry>, cutoff: DateTime<Utc>) -> u64 {
    let before = map.len();
    map.retain(|_, entry| entry.timestamp >= cutoff);
    (before - map.len()) as u64
}

#[async_trait]
impl PresenceStore for MemoryStore {
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut guard = self.entries.write().await;
        let map = guard.as_mut().ok_or(StoreError::Closed)?;
        Ok(sweep(map, cutoff))
    }

    async fn find_by_id(&self, id: VisitorId) -> Result<Option<PresenceEntry>, StoreError> {
        let guard = self.entries.read().await;
        let map = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, entry: &PresenceEntry) -> Result<(), StoreError> {
        let mut guard = self.entries.write().await;
        let map = guard.as_mut().ok_or(StoreError::Closed)?;
        if map.contains_key(&entry.id) {
            return Err(StoreError::Duplicate(entry.id));
        }
        map.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let guard = self.entries.read().await;
        let map = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(map.len() as u64)
    }

    async fn record_atomic(
        &self,
        entry: &PresenceEntry,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut guard = self.entries.write().await;
        let map = guard.as_mut().ok_or(StoreError::Closed)?;
        sweep(map, cutoff);
        map.entry(entry.id).or_insert_with(|| entry.clone());
        Ok(map.len() as u64)
    }

    async fn close(&self) {
        self.entries.write().await.take();
    }
}
