//! # Session Configuration
//!
//! One configuration object, built once at startup and handed to the
//! session's constructors. Nothing below the session reads ambient
//! globals: the cache path and remote endpoints all flow through here.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::warn;

use parkpin_db::DbConfig;
use parkpin_sync::SyncConfig;

/// Environment variable overriding the cache database path.
const DB_PATH_ENV: &str = "PARKPIN_DB_PATH";

/// Cache database filename under the platform data directory.
const DB_FILENAME: &str = "parkpin.db";

// =============================================================================
// Session Configuration
// =============================================================================

/// Everything the session needs to start: where the cache lives and how
/// to reach the remote store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Local cache database settings.
    pub db: DbConfig,

    /// Remote sync settings.
    pub sync: SyncConfig,
}

impl SessionConfig {
    /// Builds a configuration from explicit parts.
    pub fn new(db: DbConfig, sync: SyncConfig) -> Self {
        SessionConfig { db, sync }
    }

    /// Platform defaults: cache in the OS data directory, sync settings
    /// from the TOML config file (or built-in defaults when absent).
    ///
    /// ## Paths
    /// - **macOS**: `~/Library/Application Support/com.parkpin.app/parkpin.db`
    /// - **Windows**: `%APPDATA%\parkpin\app\data\parkpin.db`
    /// - **Linux**: `~/.local/share/app/parkpin.db`
    ///
    /// `PARKPIN_DB_PATH` overrides the cache path for development.
    pub fn load_or_default() -> Self {
        SessionConfig {
            db: DbConfig::new(Self::default_db_path()),
            sync: SyncConfig::load_or_default(None),
        }
    }

    /// Isolated in-memory cache with default sync settings, for tests.
    pub fn in_memory() -> Self {
        SessionConfig {
            db: DbConfig::in_memory(),
            sync: SyncConfig::default(),
        }
    }

    /// Resolves the cache database path.
    fn default_db_path() -> PathBuf {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            return PathBuf::from(path);
        }

        match ProjectDirs::from("com", "parkpin", "app") {
            Some(dirs) => dirs.data_dir().join(DB_FILENAME),
            None => {
                warn!("No platform data directory, using working directory for cache");
                PathBuf::from(DB_FILENAME)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_config_is_isolated() {
        let config = SessionConfig::in_memory();
        assert_eq!(config.db.database_path.to_str(), Some(":memory:"));
        assert!(config.sync.is_sync_enabled());
        assert!(config.sync.remote_url().is_none());
    }

    #[test]
    fn test_env_override_wins() {
        std::env::set_var(DB_PATH_ENV, "/tmp/pins-test.db");
        let path = SessionConfig::default_db_path();
        std::env::remove_var(DB_PATH_ENV);
        assert_eq!(path, PathBuf::from("/tmp/pins-test.db"));
    }
}
