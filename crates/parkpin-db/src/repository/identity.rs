//! # Identity Repository
//!
//! Persists the device user identifier.
//!
//! ParkPin has no accounts. Each install mints one identifier on first run
//! and keys its remote collection by it (`/users/{id}/locations`). The id
//! must survive restarts: losing it would orphan the user's remote records.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;

/// Cache key the device user id lives under.
const USER_ID_KEY: &str = "user_id";

/// Prefix on generated device user ids.
const USER_ID_PREFIX: &str = "user-";

/// Repository for the persisted device identity.
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: SqlitePool,
}

impl IdentityRepository {
    /// Creates a new IdentityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IdentityRepository { pool }
    }

    /// Returns the stored device user id, generating and persisting one on
    /// first run.
    ///
    /// ## Guarantee
    /// Every call after the first returns the same id, across restarts.
    /// A concurrent first call cannot produce two ids: the insert is
    /// `ON CONFLICT DO NOTHING` and the winner is re-read afterwards.
    pub async fn get_or_create(&self) -> DbResult<String> {
        if let Some(id) = self.get().await? {
            return Ok(id);
        }

        let candidate = format!("{}{}", USER_ID_PREFIX, Uuid::new_v4());
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(USER_ID_KEY)
        .bind(&candidate)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // Re-read in case another task won the insert.
        let id: String = sqlx::query_scalar("SELECT value FROM cache_entries WHERE key = ?1")
            .bind(USER_ID_KEY)
            .fetch_one(&self.pool)
            .await?;

        if id == candidate {
            info!(user_id = %id, "Generated device user id");
        }

        Ok(id)
    }

    /// Returns the stored device user id without generating one.
    pub async fn get(&self) -> DbResult<Option<String>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT value FROM cache_entries WHERE key = ?1")
                .bind(USER_ID_KEY)
                .fetch_optional(&self.pool)
                .await?;

        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_get_before_create_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.identity().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = db.identity().get_or_create().await.unwrap();
        let second = db.identity().get_or_create().await.unwrap();

        assert!(first.starts_with(USER_ID_PREFIX));
        assert_eq!(first, second);
        assert_eq!(db.identity().get().await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_identity_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parkpin.db");

        let first = {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let id = db.identity().get_or_create().await.unwrap();
            db.close().await;
            id
        };

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let second = db.identity().get_or_create().await.unwrap();
        assert_eq!(first, second);
    }
}
