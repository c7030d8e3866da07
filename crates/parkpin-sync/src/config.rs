//! # Sync Configuration
//!
//! Configuration management for the sync layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PARKPIN_REMOTE_URL=https://api.parkpin.example/v1                  │
//! │     PARKPIN_SYNC_ENABLED=false                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/parkpin/sync.toml (Linux)                                │
//! │     ~/Library/Application Support/com.parkpin.app/sync.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     sync enabled, no remote URL configured                             │
//! │                                                                         │
//! │  The device user id is NOT config: it is minted once and persisted     │
//! │  in the local cache, because losing it would orphan the user's         │
//! │  remote records.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [sync]
//! enabled = true
//!
//! [remote]
//! base_url = "https://api.parkpin.example/v1"
//! connect_timeout_secs = 10
//! request_timeout_secs = 30
//!
//! [photos]
//! # Falls back to remote.base_url when unset
//! base_url = "https://photos.parkpin.example/v1"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Sync Settings
// =============================================================================

/// Sync behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Whether remote sync is enabled at all.
    ///
    /// When false the app runs purely from the local cache: no pulls, no
    /// pushes, no photo uploads. Local mutations still persist.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings { enabled: true }
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Remote store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the remote location collection API.
    ///
    /// The per-user collection lives at `{base_url}/users/{id}/locations`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Connection timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Overall request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            base_url: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Photo Settings
// =============================================================================

/// Photo storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoSettings {
    /// Base URL of the photo storage API.
    ///
    /// Uploads go to `{base_url}/users/{id}/photos`. When unset, the
    /// remote store's base URL is used.
    #[serde(default)]
    pub base_url: Option<String>,
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
///
/// ## Example Config File
/// ```toml
/// [sync]
/// enabled = true
///
/// [remote]
/// base_url = "https://api.parkpin.example/v1"
/// connect_timeout_secs = 10
/// request_timeout_secs = 30
///
/// [photos]
/// base_url = "https://photos.parkpin.example/v1"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Sync behavior settings.
    #[serde(default)]
    pub sync: SyncSettings,

    /// Remote store settings.
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Photo storage settings.
    #[serde(default)]
    pub photos: PhotoSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        // Base URLs, when set, must be http(s)
        for url in [&self.remote.base_url, &self.photos.base_url]
            .into_iter()
            .flatten()
        {
            let parsed = Url::parse(url)?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(SyncError::InvalidUrl(format!(
                    "Base URL must be http or https, got: {}",
                    url
                )));
            }
        }

        if self.remote.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Sync enabled
        if let Ok(enabled) = std::env::var("PARKPIN_SYNC_ENABLED") {
            if let Ok(parsed) = enabled.parse::<bool>() {
                debug!(enabled = parsed, "Overriding sync enabled from environment");
                self.sync.enabled = parsed;
            }
        }

        // Remote base URL
        if let Ok(url) = std::env::var("PARKPIN_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.base_url = Some(url);
        }

        // Photo storage base URL
        if let Ok(url) = std::env::var("PARKPIN_PHOTOS_URL") {
            debug!(url = %url, "Overriding photo URL from environment");
            self.photos.base_url = Some(url);
        }

        // Request timeout
        if let Ok(timeout) = std::env::var("PARKPIN_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.remote.request_timeout_secs = secs;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "parkpin", "app").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("sync.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns true if sync is enabled.
    pub fn is_sync_enabled(&self) -> bool {
        self.sync.enabled
    }

    /// Returns the remote base URL if configured.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote.base_url.as_deref()
    }

    /// Returns the photo storage base URL, falling back to the remote URL.
    pub fn photos_url(&self) -> Option<&str> {
        self.photos
            .base_url
            .as_deref()
            .or(self.remote.base_url.as_deref())
    }
}
