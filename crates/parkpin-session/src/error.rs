//! # Session Error Types
//!
//! The session aggregates errors from every layer below it, but very few of
//! them ever reach a caller:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     What surfaces, what doesn't                         │
//! │                                                                         │
//! │  Surfaces as Err from a command:                                        │
//! │  ├── Core        invalid command (no active pin, unknown history id,   │
//! │  │               bad label)                                            │
//! │  ├── Db          the awaited cache write failed — the one failure      │
//! │  │               that genuinely breaks a command's contract            │
//! │  └── Sync        startup configuration problems only                   │
//! │                                                                         │
//! │  Never surfaces (absorbed, logged, shown via SyncStatus):              │
//! │  ├── push/pull/upload failures  → SyncStatus.last_error                │
//! │  ├── missing GPS fix            → warn + no-op                         │
//! │  └── offline while mutating     → stays local, next flush retries      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use parkpin_core::{CoreError, ValidationError};
use parkpin_db::DbError;
use parkpin_sync::SyncError;

// =============================================================================
// Session Error
// =============================================================================

/// Errors surfaced by session commands and startup.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The command was invalid against the current parking state.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// The local cache could not be read or written.
    #[error("Local cache error: {0}")]
    Db(#[from] DbError),

    /// Sync layer failure, at startup (bad configuration) or when a
    /// caller drives the engine directly.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// The background worker is gone; the session is shutting down.
    #[error("Session is shutting down")]
    ShuttingDown,
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Core(CoreError::Validation(err))
    }
}

/// Convenience type alias for Results with SessionError.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Unit Tests
// =============================================================================
