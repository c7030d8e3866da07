//! # Session Events
//!
//! Observer seam between the session and whatever renders it. The session
//! emits a fresh snapshot after every committed mutation; the frontend
//! (a map view, typically) subscribes and redraws from the snapshot instead
//! of reaching into session internals.

use parkpin_core::CacheSnapshot;
use parkpin_sync::SyncStatus;

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for delivering session events to a frontend integration.
pub trait SessionEventEmitter: Send + Sync {
    /// A mutation committed; `snapshot` is the state to render.
    fn state_changed(&self, snapshot: &CacheSnapshot);

    /// The sync indicator changed (connectivity, activity, pending count).
    fn sync_changed(&self, status: &SyncStatus);

    /// A background sync operation failed. Informational only: local
    /// state is unaffected and retryable work waits for the next flush.
    fn sync_error(&self, message: &str, retryable: bool);
}

/// No-op event emitter for headless use and testing.
pub struct NoOpEmitter;

impl SessionEventEmitter for NoOpEmitter {
    fn state_changed(&self, _snapshot: &CacheSnapshot) {}
    fn sync_changed(&self, _status: &SyncStatus) {}
    fn sync_error(&self, _message: &str, _retryable: bool) {}
}
