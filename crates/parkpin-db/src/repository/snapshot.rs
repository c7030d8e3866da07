//! # Snapshot Repository
//!
//! Persists the full state snapshot document to the local cache.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Snapshot Write Semantics                            │
//! │                                                                         │
//! │  Every state mutation ends here BEFORE any push is queued:              │
//! │                                                                         │
//! │  mutate in-memory state                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  snapshots().save(&snapshot).await   ← awaited, never skipped           │
//! │       │                                                                 │
//! │       │  INSERT ... ON CONFLICT (key) DO UPDATE                         │
//! │       ▼                                                                 │
//! │  cache_entries['state'] = <whole document>                              │
//! │                                                                         │
//! │  The value is replaced wholesale in a single statement, so a reader     │
//! │  always sees either the previous snapshot or the new one, never a      │
//! │  partial write.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use parkpin_core::CacheSnapshot;

/// Cache key the snapshot document lives under.
const SNAPSHOT_KEY: &str = "state";

/// Repository for the cached state snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Persists a snapshot, replacing any previous one.
    ///
    /// ## Atomicity
    /// The whole document is written in one UPSERT. There is no partial
    /// state a concurrent reader could observe.
    ///
    /// ## Example
    /// ```rust,ignore
    /// db.snapshots().save(&snapshot).await?;
    /// ```
    pub async fn save(&self, snapshot: &CacheSnapshot) -> DbResult<()> {
        let value = serde_json::to_string(snapshot)?;
        let now = Utc::now();

        debug!(
            status = %snapshot.parking_status(),
            saved = snapshot.saved_locations.len(),
            "Saving state snapshot"
        );

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(SNAPSHOT_KEY)
        .bind(&value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the last saved snapshot.
    ///
    /// ## Returns
    /// * `Ok(Some(snapshot))` - The previously persisted state
    /// * `Ok(None)` - First run, nothing cached yet
    /// * `Err(DbError::Serialization)` - The cached document does not parse
    pub async fn load(&self) -> DbResult<Option<CacheSnapshot>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM cache_entries WHERE key = ?1")
                .bind(SNAPSHOT_KEY)
                .fetch_optional(&self.pool)
                .await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Deletes the cached snapshot.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?1")
            .bind(SNAPSHOT_KEY)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
