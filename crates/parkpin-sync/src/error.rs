//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Connectivity  │  │     Remote              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Offline        │  │  RemoteRejected         │ │
//! │  │  InvalidUrl     │  │  Connection     │  │  RecordNotFound         │ │
//! │  │  Load/Save      │  │  Timeout        │  │  Unauthorized           │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │     Wire        │  │    Internal     │                              │
//! │  │                 │  │                 │                              │
//! │  │  Serialization  │  │  ChannelError   │                              │
//! │  │  Deserialization│  │  ShuttingDown   │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! │                                                                         │
//! │  POLICY: connectivity-shaped errors are never fatal. A failed push     │
//! │  leaves the local cache authoritative; the unsynced records keep       │
//! │  their local- ids and the next reconnect flush picks them up.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Invalid remote base URL.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Connectivity Errors
    // =========================================================================
    /// Operation attempted while the device is offline.
    #[error("Device is offline")]
    Offline,

    /// Failed to reach the remote store.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Remote request timed out.
    #[error("Remote request timed out")]
    Timeout,

    // =========================================================================
    // Remote Store Errors
    // =========================================================================
    /// Remote store rejected the request.
    #[error("Remote rejected request: {status} - {message}")]
    RemoteRejected { status: u16, message: String },

    /// Record does not exist remotely.
    #[error("Remote record not found: {0}")]
    RecordNotFound(String),

    /// Credentials were rejected.
    #[error("Unauthorized by remote store")]
    Unauthorized,

    /// Photo upload failed.
    #[error("Photo upload failed: {0}")]
    UploadFailed(String),

    // =========================================================================
    // Wire Errors
    // =========================================================================
    /// Failed to serialize a record for the wire.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Remote response did not parse.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal sync error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Sync worker is shutting down.
    #[error("Sync worker is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout
        } else if err.is_connect() {
            SyncError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            SyncError::DeserializationFailed(err.to_string())
        } else {
            SyncError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if the failure is connectivity-shaped and the next
    /// reconnect flush can plausibly succeed.
    ///
    /// ## Retryable Errors
    /// - Offline, connection failures, timeouts
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - Authorization and explicit remote rejections
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Offline | SyncError::ConnectionFailed(_) | SyncError::Timeout
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if this error indicates a wire format mismatch.
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            SyncError::SerializationFailed(_) | SyncError::DeserializationFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::Offline.is_retryable());
        assert!(SyncError::ConnectionFailed("network down".into()).is_retryable());
        assert!(SyncError::Timeout.is_retryable());

        assert!(!SyncError::Unauthorized.is_retryable());
        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
        assert!(!SyncError::RemoteRejected {
            status: 422,
            message: "bad record".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::InvalidUrl("not a url".into()).is_config_error());
        assert!(!SyncError::Offline.is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::RemoteRejected {
            status: 503,
            message: "maintenance".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
    }
}
