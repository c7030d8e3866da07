//! # History Repository
//!
//! Persists the bounded parking history log.
//!
//! The log is device-local by design: it is cached next to the snapshot but
//! never pushed to the remote store, so each device keeps its own trail of
//! recent spots. The whole array is replaced on every write, mirroring the
//! snapshot document's whole-value semantics.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use parkpin_core::ParkingHistory;

/// Cache key the history array lives under.
const HISTORY_KEY: &str = "history";

/// Repository for the parking history log.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    /// Creates a new HistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Persists the history log, replacing any previous one.
    pub async fn save(&self, history: &ParkingHistory) -> DbResult<()> {
        let value = serde_json::to_string(history)?;
        let now = Utc::now();

        debug!(entries = history.len(), "Saving parking history");

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(HISTORY_KEY)
        .bind(&value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the history log, or an empty log on first run.
    ///
    /// The bound is re-applied on load, so a cached log written before a
    /// capacity change can never exceed the current limit.
    pub async fn load(&self) -> DbResult<ParkingHistory> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM cache_entries WHERE key = ?1")
                .bind(HISTORY_KEY)
                .fetch_optional(&self.pool)
                .await?;

        match value {
            Some(json) => {
                let entries = serde_json::from_str(&json)?;
                Ok(ParkingHistory::from_entries(entries))
            }
            None => Ok(ParkingHistory::new()),
        }
    }

    /// Deletes the cached history log.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?1")
            .bind(HISTORY_KEY)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use parkpin_core::{Coordinates, HistoryEntry, HISTORY_CAPACITY};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn entry_at(lat: f64) -> HistoryEntry {
        HistoryEntry::archive(Coordinates::new(lat, -122.0), None)
    }

    #[tokio::test]
    async fn test_load_before_first_save_is_empty() {
        let db = test_db().await;
        let history = db.history().load().await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let db = test_db().await;

        let mut history = ParkingHistory::new();
        let older = entry_at(37.1);
        let newer = entry_at(37.2);
        history.push(older.clone());
        history.push(newer.clone());

        db.history().save(&history).await.unwrap();
        let loaded = db.history().load().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.entries()[0].id, newer.id);
        assert_eq!(loaded.entries()[1].id, older.id);
    }

    #[tokio::test]
    async fn test_load_re_applies_capacity_bound() {
        let db = test_db().await;

        // Write an over-long array directly, bypassing ParkingHistory.
        let entries: Vec<_> = (0..HISTORY_CAPACITY + 3)
            .map(|i| entry_at(37.0 + i as f64 / 10.0))
            .collect();
        let json = serde_json::to_string(&entries).unwrap();
        sqlx::query(
            "INSERT INTO cache_entries (key, value, updated_at) VALUES ('history', ?1, ?2)",
        )
        .bind(&json)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let loaded = db.history().load().await.unwrap();
        assert_eq!(loaded.len(), HISTORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_clear_removes_history() {
        let db = test_db().await;

        let mut history = ParkingHistory::new();
        history.push(entry_at(37.1));
        db.history().save(&history).await.unwrap();

        db.history().clear().await.unwrap();
        assert!(db.history().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_and_snapshot_keys_do_not_collide() {
        let db = test_db().await;

        let mut history = ParkingHistory::new();
        history.push(entry_at(37.1));
        db.history().save(&history).await.unwrap();
        db.snapshots()
            .save(&parkpin_core::CacheSnapshot::empty())
            .await
            .unwrap();

        assert_eq!(db.history().load().await.unwrap().len(), 1);
        assert!(db.snapshots().load().await.unwrap().is_some());
    }
}
