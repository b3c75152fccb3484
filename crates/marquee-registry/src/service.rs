//! Presence registry: record a visitor and report how many are active.

use std::sync::Arc;

use chrono::Duration;
use marquee_common::{ConfigError, ParseVisitorIdError, StoreError, VisitorId};
use marquee_config::Consistency;
use tracing::debug;

use crate::clock::Clock;
use crate::error::{RegistryError, INVALID_ID, MISSING_ID};
use crate::store::{PresenceEntry, PresenceStore};

/// Validate the raw `id` query value. An absent or empty value is
/// "missing"; anything that is not an `i32` is "invalid".
pub fn parse_visitor_id(raw: Option<&str>) -> Result<VisitorId, RegistryError> {
    match raw.map(str::parse::<VisitorId>) {
        None | Some(Err(ParseVisitorIdError::Empty)) => Err(RegistryError::BadRequest(MISSING_ID)),
        Some(Err(ParseVisitorIdError::Invalid(_))) => Err(RegistryError::BadRequest(INVALID_ID)),
        Some(Ok(id)) => Ok(id),
    }
}

#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
    consistency: Consistency,
}

impl RegistryService {
    /// Fails when `window_secs` does not fit a `chrono::Duration`.
    pub fn new(
        store: Arc<dyn PresenceStore>,
        clock: Arc<dyn Clock>,
        window_secs: u64,
        consistency: Consistency,
    ) -> Result<Self, ConfigError> {
        let window = i64::try_from(window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "registry.activity_window_secs = {window_secs} is out of range"
                ))
            })?;

        Ok(Self {
            store,
            clock,
            window,
            consistency,
        })
    }

    pub fn store(&self) -> &Arc<dyn PresenceStore> {
        &self.store
    }

    /// Record `id` as present and return the number of active entries.
    ///
    /// Entries older than the window are swept first, whoever is asking.
    /// An existing entry is never refreshed, so a visitor counts as active
    /// only during the window after their first report.
    pub async fn report(&self, id: VisitorId, client_addr: &str) -> Result<u64, RegistryError> {
        let now = self.clock.now();
        let cutoff = now - self.window;
        let entry = PresenceEntry::new(id, client_addr, now);

        let count = match self.consistency {
            Consistency::Atomic => self.store.record_atomic(&entry, cutoff).await?,
            Consistency::Stepwise => {
                let swept = self.store.delete_older_than(cutoff).await?;
                if swept > 0 {
                    debug!(swept, "Swept expired presence entries");
                }

                if self.store.find_by_id(id).await?.is_none() {
                    match self.store.insert(&entry).await {
                        Ok(()) => debug!(visitor = %id, ip = %client_addr, "Presence entry created"),
                        // A concurrent first report for the same id got there first.
                        Err(StoreError::Duplicate(_)) => {
                            debug!(visitor = %id, "Lost insert race, entry already present")
                        }
                        Err(e) => return Err(e.into()),
                    }
                }

                self.store.count().await?
            }
        };

        Ok(count)
    }

    /// Remove expired entries without recording anyone.
    pub async fn sweep(&self) -> Result<u64, RegistryError> {
        let cutoff = self.clock.now() - self.window;
        Ok(self.store.delete_older_than(cutoff).await?)
    }
}
