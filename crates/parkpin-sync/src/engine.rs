//! # Sync Engine
//!
//! Reconciliation between device-local parking state and the per-user
//! remote collection.
//!
//! ## Reconciliation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sync Engine Operations                             │
//! │                                                                         │
//! │  PULL (startup + reconnect, after the flush)                            │
//! │  ────                                                                   │
//! │  list all records                                                       │
//! │    ├── category=custom            ──► new saved-locations set           │
//! │    ├── category=parking ∧ active  ──► the parking pin                   │
//! │    └── category=parking ∧ !active ──► ignored (retired record)          │
//! │  Remote is authoritative at the moment of pull.                         │
//! │                                                                         │
//! │  PUSH PARKING (update-else-create)                                      │
//! │  ─────────────                                                          │
//! │  list ──► any record with category=parking?                             │
//! │    ├── yes ──► PATCH it (position, photo, active=true, syncedAt)        │
//! │    └── no  ──► POST a fresh parking record                              │
//! │  A second parking record is never created, so at most one active        │
//! │  parking record can exist. That is the whole invariant.                 │
//! │                                                                         │
//! │  PUSH SAVED (dedup by id origin)                                        │
//! │  ───────────                                                            │
//! │  for each pin with a local- id ──► POST, report id reassignment         │
//! │  pins with remote ids          ──► skipped, already synced              │
//! │                                                                         │
//! │  DEACTIVATE (clear command)                                             │
//! │  ──────────                                                             │
//! │  list ──► parking record? ──► PATCH active=false (record kept for       │
//! │  reuse by the next pin)                                                 │
//! │                                                                         │
//! │  All of these are fire-and-forget from the caller's view: failures      │
//! │  are reported, never retried here, and never roll back local state.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is stateless between calls and never touches the local cache;
//! applying outcomes to state + cache is the session worker's job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use parkpin_core::{Category, Coordinates, PhotoRef, PinId, SavedLocations};

use crate::connectivity::ConnectionState;
use crate::error::{SyncError, SyncResult};
use crate::photos::PhotoStore;
use crate::remote::{RecordDraft, RecordPatch, RemoteStore};

// =============================================================================
// Sync Status
// =============================================================================

/// Observable sync state, for the UI's connectivity/sync indicator.
///
/// Per the degradation policy, this is the only user-visible failure
/// surface: discrete push/pull errors land in `last_error`, never in a
/// blocking dialog.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Connectivity as last reported by the platform.
    #[ts(as = "String")]
    #[serde(serialize_with = "serialize_connection_state")]
    pub connection_state: ConnectionState,

    /// True while a pull or flush is in flight.
    pub is_syncing: bool,

    /// Number of saved records still carrying a local id.
    pub pending_count: usize,

    /// When the last successful pull completed.
    #[ts(as = "Option<String>")]
    pub last_pull: Option<DateTime<Utc>>,

    /// When the last successful push completed.
    #[ts(as = "Option<String>")]
    pub last_push: Option<DateTime<Utc>>,

    /// Most recent sync failure, if any.
    pub last_error: Option<String>,
}

fn serialize_connection_state<S: serde::Serializer>(
    state: &ConnectionState,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&state.to_string())
}

impl SyncStatus {
    /// True when the device is online.
    pub fn is_online(&self) -> bool {
        self.connection_state.is_online()
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus {
            connection_state: ConnectionState::Offline,
            is_syncing: false,
            pending_count: 0,
            last_pull: None,
            last_push: None,
            last_error: None,
        }
    }
}

// =============================================================================
// Operation Outcomes
// =============================================================================

/// What a pull found remotely, partitioned for the session to apply.
#[derive(Debug, Clone)]
pub struct PullOutcome {
    /// The user's saved places, wholesale. Replaces the local set.
    pub saved: SavedLocations,

    /// The active parking pin, if any record has `category=parking ∧ active`.
    pub parking: Option<RemoteParking>,
}

/// The remote parking pin as seen by a pull.
#[derive(Debug, Clone)]
pub struct RemoteParking {
    pub position: Coordinates,
    pub photo: Option<PhotoRef>,
    pub pinned_at: DateTime<Utc>,
}

/// A local id replaced by a backend-assigned id after a create.
#[derive(Debug, Clone)]
pub struct IdReassignment {
    pub local: PinId,
    pub remote: PinId,
    pub synced_at: DateTime<Utc>,
}

/// Result of flushing unsynced saved locations.
///
/// Partial success is normal: each create is independent, so some pins may
/// gain remote ids while others stay local for the next flush.
#[derive(Debug, Default)]
pub struct SavedPushOutcome {
    /// Reassignments for pins whose create succeeded.
    pub reassignments: Vec<IdReassignment>,

    /// Pins whose create failed, with the reason. They keep their local
    /// ids and remain eligible for the next flush.
    pub failures: Vec<(PinId, SyncError)>,
}

impl SavedPushOutcome {
    /// True when every unsynced pin gained a remote id.
    pub fn fully_synced(&self) -> bool {
        self.failures.is_empty()
    }
}

// =============================================================================
// Sync Engine
// =============================================================================

/// Stateless reconciliation over a [`RemoteStore`] and a [`PhotoStore`].
#[derive(Clone)]
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    photos: Arc<dyn PhotoStore>,
    user_id: String,
}

impl SyncEngine {
    /// Creates an engine for one user's collection.
    pub fn new(remote: Arc<dyn RemoteStore>, photos: Arc<dyn PhotoStore>, user_id: String) -> Self {
        SyncEngine {
            remote,
            photos,
            user_id,
        }
    }

    /// The device user id this engine syncs for.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // =========================================================================
    // Pull
    // =========================================================================

    /// Fetches the user's remote records and partitions them.
    ///
    /// Custom records become the new saved set; the record with
    /// `category=parking ∧ active` (at most one exists) becomes the parking
    /// pin. A retired parking record is ignored: it only exists so the next
    /// pin can reuse it.
    pub async fn pull(&self) -> SyncResult<PullOutcome> {
        let records = self.remote.list(&self.user_id).await?;
        debug!(count = records.len(), "Pulled remote records");

        let mut saved = SavedLocations::new();
        let mut parking = None;

        for record in records {
            match record.category {
                Category::Custom => saved.add(record.into_pin()),
                Category::Parking if record.is_active => {
                    parking = Some(RemoteParking {
                        position: record.position(),
                        photo: record.photo_url.map(PhotoRef::from_wire),
                        pinned_at: record.timestamp,
                    });
                }
                Category::Parking => {
                    // Retired parking record, kept remotely for reuse
                }
            }
        }

        info!(
            saved = saved.len(),
            has_parking = parking.is_some(),
            "Pull complete"
        );

        Ok(PullOutcome { saved, parking })
    }

    // =========================================================================
    // Push: parking
    // =========================================================================

    /// Pushes the parking pin, updating the existing remote parking record
    /// in place or creating it if none exists.
    pub async fn push_parking(
        &self,
        position: Coordinates,
        photo: Option<&PhotoRef>,
    ) -> SyncResult<()> {
        let photo_url = photo.map(|p| p.as_str().to_string());

        match self.find_parking_record().await? {
            Some(record_id) => {
                debug!(%record_id, "Updating remote parking record");
                self.remote
                    .update(
                        &self.user_id,
                        &record_id,
                        &RecordPatch::parking_update(position, photo_url),
                    )
                    .await?;
            }
            None => {
                debug!("No remote parking record, creating one");
                self.remote
                    .create(&self.user_id, &RecordDraft::parking(position, photo_url))
                    .await?;
            }
        }

        info!("Parking pin pushed");
        Ok(())
    }

    /// Retires the remote parking record after a clear.
    ///
    /// No record remotely means nothing to retire; that is not an error
    /// (the pin may never have been pushed).
    pub async fn deactivate_parking(&self) -> SyncResult<()> {
        match self.find_parking_record().await? {
            Some(record_id) => {
                debug!(%record_id, "Deactivating remote parking record");
                self.remote
                    .update(&self.user_id, &record_id, &RecordPatch::deactivation())
                    .await?;
                info!("Parking pin deactivated remotely");
            }
            None => {
                debug!("No remote parking record to deactivate");
            }
        }

        Ok(())
    }

    /// Finds the id of the user's parking record, active or not.
    async fn find_parking_record(&self) -> SyncResult<Option<String>> {
        let records = self.remote.list(&self.user_id).await?;
        Ok(records
            .into_iter()
            .find(|r| r.category == Category::Parking)
            .map(|r| r.id))
    }

    // =========================================================================
    // Push: saved locations
    // =========================================================================

    /// Creates a remote record for every pin still carrying a local id.
    ///
    /// Pins with remote ids are never re-created — the id origin is the
    /// dedup key. Failures are collected per pin, not short-circuited, so
    /// one bad create does not strand the rest of the flush.
    pub async fn push_saved(&self, saved: &SavedLocations) -> SavedPushOutcome {
        let mut outcome = SavedPushOutcome::default();

        for pin in saved.unsynced() {
            let draft = RecordDraft::custom(pin);
            match self.remote.create(&self.user_id, &draft).await {
                Ok(record) => {
                    let synced_at = record.synced_at.unwrap_or_else(Utc::now);
                    debug!(local = %pin.id, remote = %record.id, "Saved location created remotely");
                    outcome.reassignments.push(IdReassignment {
                        local: pin.id.clone(),
                        remote: PinId::remote(record.id),
                        synced_at,
                    });
                }
                Err(e) => {
                    warn!(local = %pin.id, error = %e, "Saved location create failed");
                    outcome.failures.push((pin.id.clone(), e));
                }
            }
        }

        if !outcome.reassignments.is_empty() {
            info!(
                created = outcome.reassignments.len(),
                failed = outcome.failures.len(),
                "Saved locations flushed"
            );
        }

        outcome
    }

    /// Deletes a saved location's remote record.
    ///
    /// A local-only id means the record was never pushed; there is nothing
    /// to delete remotely and the call is a no-op.
    pub async fn delete_saved(&self, id: &PinId) -> SyncResult<()> {
        if id.is_local() {
            debug!(%id, "Never synced, skipping remote delete");
            return Ok(());
        }

        self.remote.delete(&self.user_id, id.as_str()).await?;
        info!(%id, "Saved location deleted remotely");
        Ok(())
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// Uploads photo bytes, returning the durable reference that replaces
    /// the inline one.
    pub async fn upload_photo(&self, bytes: Vec<u8>, content_type: &str) -> SyncResult<PhotoRef> {
        let url = self.photos.upload(&self.user_id, bytes, content_type).await?;
        info!(%url, "Photo uploaded");
        Ok(PhotoRef::Url(url))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
