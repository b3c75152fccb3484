//! SQLite presence store.
//!
//! Table layout:
//!
//! ```sql
//! presence_entries (
//!     id        INTEGER PRIMARY KEY NOT NULL,  -- visitor id
//!     ip        TEXT NOT NULL,
//!     timestamp INTEGER NOT NULL               -- UTC epoch millis
//! )
//! ```
//!
//! The pool holds a single connection. SQLite allows one writer at a time
//! anyway, and `sqlite::memory:` databases only exist per connection.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_common::{StoreError, VisitorId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{PresenceEntry, PresenceStore};

const INSERT_IF_ABSENT: &str =
    "INSERT INTO presence_entries (id, ip, timestamp) VALUES (?, ?, ?) ON CONFLICT(id) DO NOTHING";
const DELETE_OLDER_THAN: &str = "DELETE FROM presence_entries WHERE timestamp < ?";
const COUNT: &str = "SELECT COUNT(*) FROM presence_entries";

pub struct SqliteStore {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolClosed => StoreError::Closed,
        other => StoreError::Database(other.to_string()),
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Database(format!("timestamp out of range: {millis}")))
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://marquee.db`, `sqlite::memory:`),
    /// creating the database file and schema if missing.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .map_err(db_err)?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS presence_entries (
                id INTEGER PRIMARY KEY NOT NULL,
                ip TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_presence_entries_timestamp
             ON presence_entries (timestamp)",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl PresenceStore for SqliteStore {
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(DELETE_OLDER_THAN)
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: VisitorId) -> Result<Option<PresenceEntry>, StoreError> {
        let row = sqlx::query_as::<_, (i32, String, i64)>(
            "SELECT id, ip, timestamp FROM presence_entries WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|(id, ip, millis)| {
            Ok(PresenceEntry::new(
                VisitorId::new(id),
                ip,
                millis_to_datetime(millis)?,
            ))
        })
        .transpose()
    }

    async fn insert(&self, entry: &PresenceEntry) -> Result<(), StoreError> {
        let result = sqlx::query(INSERT_IF_ABSENT)
            .bind(entry.id.get())
            .bind(&entry.ip)
            .bind(entry.timestamp.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(entry.id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(COUNT)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count.max(0) as u64)
    }

    async fn record_atomic(
        &self,
        entry: &PresenceEntry,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(DELETE_OLDER_THAN)
            .bind(cutoff.timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query(INSERT_IF_ABSENT)
            .bind(entry.id.get())
            .bind(&entry.ip)
            .bind(entry.timestamp.timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let count: i64 = sqlx::query_scalar(COUNT)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(count.max(0) as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
