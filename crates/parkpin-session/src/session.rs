//! # Session Facade
//!
//! The command surface a frontend talks to. One `Session` per process:
//! it loads the cache before anything else, owns the in-memory state, and
//! keeps the background worker fed.
//!
//! ## Command Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every mutating command                               │
//! │                                                                         │
//! │   1. mutate in-memory state        (under the write lock)               │
//! │   2. write the cache snapshot      (awaited — the one failing step)     │
//! │   3. emit state_changed            (frontend redraws)                   │
//! │   4. schedule the push             (only when online; fire-and-forget)  │
//! │                                                                         │
//! │   The cache write is never skipped: a push failure later cannot         │
//! │   un-happen the local mutation.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup
//! Cache first, network never: `SessionBuilder::start` renders entirely
//! from the local cache and does not touch the remote store. The embedder
//! reports connectivity via [`Session::set_online`]; the first transition
//! to online triggers the flush-then-pull reconcile.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use parkpin_core::{
    validate_coordinates, validate_label, CacheSnapshot, Coordinates, HistoryEntry, LocationPin,
    ParkingHistory, ParkingStatus, PinId, SavedLocations,
};
use parkpin_db::{Database, DbError};
use parkpin_sync::{
    inline_photo, Connectivity, PhotoStore, RemoteStore, RestPhotoStore, RestRemoteStore,
    SyncEngine, SyncStatus,
};

use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::events::{NoOpEmitter, SessionEventEmitter};
use crate::state::ParkingState;
use crate::worker::{SyncJob, SyncWorker, SyncWorkerHandle};

// =============================================================================
// Session
// =============================================================================

/// A running ParkPin session.
pub struct Session {
    state: Arc<RwLock<ParkingState>>,
    db: Arc<Database>,
    worker: Option<SyncWorkerHandle>,
    connectivity: Connectivity,
    status: Arc<RwLock<SyncStatus>>,
    emitter: Arc<dyn SessionEventEmitter>,
    user_id: String,
}

impl Session {
    /// Starts a builder for a session with non-default collaborators.
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    /// Starts a session against the REST remote store from the config.
    pub async fn start(config: SessionConfig) -> SessionResult<Session> {
        SessionBuilder::new(config).start().await
    }

    // =========================================================================
    // Geolocation Ingress
    // =========================================================================

    /// Records a position sample from the geolocation provider.
    ///
    /// Only the most recent sample is kept. Samples outside valid
    /// coordinate ranges are dropped with a warning, matching the policy
    /// for every other sensor hiccup.
    pub async fn update_location(&self, position: Coordinates) {
        if let Err(e) = validate_coordinates(position) {
            warn!(error = %e, "Ignoring invalid position sample");
            return;
        }
        self.state.write().await.last_position = Some(position);
    }

    // =========================================================================
    // Parking Commands
    // =========================================================================

    /// Pins the car at the current position.
    ///
    /// A previous pin is archived to history first. Without a position fix
    /// this is a logged no-op; the UI disables the button in the same case.
    pub async fn pin(&self) -> SessionResult<()> {
        let (snapshot, history, position) = {
            let mut state = self.state.write().await;
            let Some(position) = state.last_position else {
                warn!("No position fix yet, cannot pin the car");
                return Ok(());
            };
            let archived = state.pin(position);
            let history = archived.then(|| state.history.clone());
            (state.snapshot(), history, position)
        };

        self.commit(&snapshot, history.as_ref()).await?;
        self.schedule_push(SyncJob::PushParking {
            position,
            photo: None,
        })
        .await;

        info!(%position, "Car pinned");
        Ok(())
    }

    /// Attaches a photo to the active pin.
    ///
    /// Two phases: the inline representation is committed (and pushed)
    /// immediately, then — online only — the bytes are uploaded in the
    /// background and the durable URL replaces the inline reference in
    /// memory and cache once the upload resolves.
    pub async fn attach_photo(&self, bytes: Vec<u8>, content_type: &str) -> SessionResult<()> {
        let inline = inline_photo(&bytes, content_type);

        let (snapshot, position) = {
            let mut state = self.state.write().await;
            let position = state.attach_photo(inline.clone())?;
            (state.snapshot(), position)
        };

        self.commit(&snapshot, None).await?;
        self.schedule_push(SyncJob::PushParking {
            position,
            photo: Some(inline),
        })
        .await;
        self.schedule_push(SyncJob::UploadPhoto {
            bytes,
            content_type: content_type.to_string(),
        })
        .await;

        info!("Photo attached to parking pin");
        Ok(())
    }

    /// Clears the pin, archiving it to history.
    ///
    /// Remotely this deactivates the parking record rather than deleting
    /// it; the record is reused by the next pin.
    pub async fn clear(&self) -> SessionResult<()> {
        let (snapshot, history) = {
            let mut state = self.state.write().await;
            if !state.clear() {
                debug!("No active pin to clear");
                return Ok(());
            }
            (state.snapshot(), state.history.clone())
        };

        self.commit(&snapshot, Some(&history)).await?;
        self.schedule_push(SyncJob::DeactivateParking).await;

        info!("Parking pin cleared");
        Ok(())
    }

    /// Re-enters the active state from a history entry. The entry stays
    /// in the log.
    pub async fn restore_from_history(&self, entry_id: &str) -> SessionResult<()> {
        let (snapshot, restored) = {
            let mut state = self.state.write().await;
            let restored = state.restore(entry_id)?;
            (state.snapshot(), restored)
        };

        self.commit(&snapshot, None).await?;
        self.schedule_push(SyncJob::PushParking {
            position: restored.location,
            photo: restored.photo,
        })
        .await;

        info!(entry = entry_id, "Parking pin restored from history");
        Ok(())
    }

    // =========================================================================
    // Saved-Place Commands
    // =========================================================================

    /// Saves the current position under a label.
    pub async fn add_location(&self, label: &str) -> SessionResult<()> {
        validate_label(label)?;

        let (snapshot, pending) = {
            let mut state = self.state.write().await;
            let Some(position) = state.last_position else {
                warn!("No position fix yet, cannot save this location");
                return Ok(());
            };
            state.add_saved(LocationPin::custom(label, position));
            (state.snapshot(), state.saved.unsynced_count())
        };

        self.commit(&snapshot, None).await?;
        self.refresh_pending(pending).await;
        self.schedule_push(SyncJob::PushSaved).await;

        info!(label, "Location saved");
        Ok(())
    }

    /// Deletes a saved place.
    ///
    /// The local copy always goes. The remote copy goes only when the
    /// record was synced and the device is online; a synced record deleted
    /// offline survives remotely and the next pull resurrects it.
    pub async fn delete_location(&self, id: &PinId) -> SessionResult<()> {
        let (snapshot, removed, pending) = {
            let mut state = self.state.write().await;
            let Some(removed) = state.remove_saved(id) else {
                warn!(%id, "Delete of unknown saved location ignored");
                return Ok(());
            };
            (state.snapshot(), removed, state.saved.unsynced_count())
        };

        self.commit(&snapshot, None).await?;
        self.refresh_pending(pending).await;

        if removed.is_synced() {
            if self.connectivity.is_online() {
                self.schedule_push(SyncJob::DeleteSaved { id: removed.id })
                    .await;
            } else {
                warn!(%id, "Deleted offline after sync, remote copy remains until pulled again");
            }
        }

        info!("Location deleted");
        Ok(())
    }

    // =========================================================================
    // History Commands
    // =========================================================================

    /// Empties the parking history log. Local-only, like the log itself.
    pub async fn clear_history(&self) -> SessionResult<()> {
        {
            let mut state = self.state.write().await;
            state.history.clear();
        }
        self.db.history().clear().await?;

        info!("Parking history cleared");
        Ok(())
    }

    // =========================================================================
    // Connectivity Ingress
    // =========================================================================

    /// Reports that the platform network monitor sees connectivity.
    ///
    /// On an offline → online transition the worker flushes offline work,
    /// then pulls. Returns true when this was a transition.
    pub fn set_online(&self) -> bool {
        self.connectivity.set_online()
    }

    /// Reports loss of connectivity. Returns true when this was a transition.
    pub fn set_offline(&self) -> bool {
        self.connectivity.set_offline()
    }

    /// Current connectivity as last reported.
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The renderable projection of current state.
    pub async fn snapshot(&self) -> CacheSnapshot {
        self.state.read().await.snapshot()
    }

    /// The parking status (`none` / `active-no-photo` / `active-with-photo`).
    pub async fn status(&self) -> ParkingStatus {
        self.state.read().await.status()
    }

    /// The history log, newest first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.read().await.history.entries().to_vec()
    }

    /// The saved places in display order.
    pub async fn saved_locations(&self) -> SavedLocations {
        self.state.read().await.saved.clone()
    }

    /// Miles from the latest position sample to the pinned car.
    pub async fn distance_to_parking(&self) -> Option<f64> {
        self.state.read().await.distance_to_parking()
    }

    /// The sync indicator state.
    pub async fn sync_status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// The persisted per-device user identifier.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Waits until the worker has finished everything enqueued so far.
    ///
    /// Used by shutdown, and by tests that assert on post-sync state.
    pub async fn sync_barrier(&self) -> SessionResult<()> {
        match &self.worker {
            Some(worker) => worker.barrier().await,
            None => Ok(()),
        }
    }

    /// Stops the background worker and closes the cache.
    pub async fn shutdown(&self) {
        info!("Shutting down session");
        if let Some(worker) = &self.worker {
            // Let in-flight pushes finish; they are quick and not retried
            let _ = worker.barrier().await;
            worker.shutdown().await;
        }
        self.db.close().await;
        info!("Session stopped");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Commits a mutation: cache write (awaited), then the state event.
    async fn commit(
        &self,
        snapshot: &CacheSnapshot,
        history: Option<&ParkingHistory>,
    ) -> SessionResult<()> {
        self.db.snapshots().save(snapshot).await?;
        if let Some(history) = history {
            self.db.history().save(history).await?;
        }
        self.emitter.state_changed(snapshot);
        Ok(())
    }

    /// Schedules a push when online. Offline mutations stay local; the
    /// reconnect flush picks them up by their local-id sentinel.
    async fn schedule_push(&self, job: SyncJob) {
        if !self.connectivity.is_online() {
            debug!(
                job = job.describe(),
                "Offline, mutation stays local until the next flush"
            );
            return;
        }
        let Some(worker) = &self.worker else {
            return;
        };
        if let Err(e) = worker.enqueue(job).await {
            warn!(error = %e, "Could not schedule push");
        }
    }

    /// Publishes a new pending-record count to the sync indicator.
    async fn refresh_pending(&self, pending: usize) {
        let status = {
            let mut status = self.status.write().await;
            status.pending_count = pending;
            status.clone()
        };
        self.emitter.sync_changed(&status);
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for a [`Session`] with swappable collaborators.
///
/// Production code usually wants [`Session::start`]; tests swap in the
/// in-memory remote and photo stores.
pub struct SessionBuilder {
    config: SessionConfig,
    remote: Option<Arc<dyn RemoteStore>>,
    photos: Option<Arc<dyn PhotoStore>>,
    emitter: Option<Arc<dyn SessionEventEmitter>>,
}

impl SessionBuilder {
    /// Creates a builder with the given config.
    pub fn new(config: SessionConfig) -> Self {
        SessionBuilder {
            config,
            remote: None,
            photos: None,
            emitter: None,
        }
    }

    /// Replaces the REST remote store.
    pub fn with_remote_store(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Replaces the REST photo store.
    pub fn with_photo_store(mut self, photos: Arc<dyn PhotoStore>) -> Self {
        self.photos = Some(photos);
        self
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn SessionEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Opens the cache, restores state from it, and spawns the worker.
    ///
    /// No network I/O happens here. An unreadable cached document is
    /// logged and replaced with empty state — a cold start must never
    /// fail because of an old cache shape.
    pub async fn start(self) -> SessionResult<Session> {
        let config = self.config;

        let db = Arc::new(Database::new(config.db.clone()).await?);
        let user_id = db.identity().get_or_create().await?;

        let snapshot = match db.snapshots().load().await {
            Ok(snapshot) => snapshot,
            Err(DbError::Serialization(e)) => {
                warn!(error = %e, "Cached snapshot unreadable, starting from empty state");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let history = match db.history().load().await {
            Ok(history) => history,
            Err(DbError::Serialization(e)) => {
                warn!(error = %e, "Cached history unreadable, starting with an empty log");
                ParkingHistory::new()
            }
            Err(e) => return Err(e.into()),
        };

        let state = Arc::new(RwLock::new(ParkingState::from_cache(snapshot, history)));
        let emitter = self
            .emitter
            .unwrap_or_else(|| Arc::new(NoOpEmitter) as Arc<dyn SessionEventEmitter>);

        // Offline until the embedder's network monitor says otherwise
        let connectivity = Connectivity::default();

        let pending = { state.read().await.saved.unsynced_count() };
        let status = Arc::new(RwLock::new(SyncStatus {
            pending_count: pending,
            ..SyncStatus::default()
        }));

        let worker = if config.sync.is_sync_enabled() {
            let remote = match self.remote {
                Some(remote) => remote,
                None => Arc::new(RestRemoteStore::new(&config.sync)?) as Arc<dyn RemoteStore>,
            };
            let photos = match self.photos {
                Some(photos) => photos,
                None => Arc::new(RestPhotoStore::new(&config.sync)?) as Arc<dyn PhotoStore>,
            };
            let engine = SyncEngine::new(remote, photos, user_id.clone());

            let (worker, handle) = SyncWorker::new(
                engine,
                state.clone(),
                db.snapshots(),
                status.clone(),
                emitter.clone(),
                connectivity.clone(),
            );
            tokio::spawn(worker.run());
            Some(handle)
        } else {
            info!("Sync disabled, running cache-only");
            None
        };

        let session = Session {
            state,
            db,
            worker,
            connectivity,
            status,
            emitter,
            user_id,
        };

        // Cache-first cold start: the frontend can render right now
        let startup = session.state.read().await.snapshot();
        session.emitter.state_changed(&startup);

        info!(
            user_id = %session.user_id,
            status = %startup.parking_status(),
            saved = startup.saved_locations.len(),
            "Session started from cache"
        );
        Ok(session)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parkpin_core::{CoreError, HISTORY_CAPACITY};
    use parkpin_db::DbConfig;
    use parkpin_sync::{MemoryPhotoStore, MemoryRemoteStore, SyncConfig};

    use crate::error::SessionError;

    fn trace_init() {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,parkpin_session=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    struct CountingEmitter {
        state_events: AtomicUsize,
        sync_events: AtomicUsize,
        errors: AtomicUsize,
    }

    impl CountingEmitter {
        fn new() -> Self {
            CountingEmitter {
                state_events: AtomicUsize::new(0),
                sync_events: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
            }
        }
    }

    impl SessionEventEmitter for CountingEmitter {
        fn state_changed(&self, _snapshot: &CacheSnapshot) {
            self.state_events.fetch_add(1, Ordering::SeqCst);
        }
        fn sync_changed(&self, _status: &SyncStatus) {
            self.sync_events.fetch_add(1, Ordering::SeqCst);
        }
        fn sync_error(&self, _message: &str, _retryable: bool) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn memory_session() -> (Session, Arc<MemoryRemoteStore>, Arc<MemoryPhotoStore>) {
        let remote = Arc::new(MemoryRemoteStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let session = Session::builder(SessionConfig::in_memory())
            .with_remote_store(remote.clone())
            .with_photo_store(photos.clone())
            .start()
            .await
            .unwrap();
        (session, remote, photos)
    }

    /// Brings the session online and waits for the reconnect sync.
    async fn go_online(session: &Session) {
        session.set_online();
        session.sync_barrier().await.unwrap();
    }

    fn here() -> Coordinates {
        Coordinates::new(37.7793, -122.4192)
    }

    // =========================================================================
    // Cold Start
    // =========================================================================

    #[tokio::test]
    async fn test_cold_start_renders_cache_with_zero_remote_calls() {
        trace_init();
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("parkpin.db");

        let first_user_id;
        {
            let remote = Arc::new(MemoryRemoteStore::new());
            let config = SessionConfig::new(
                DbConfig::new(&db_path),
                SyncConfig::default(),
            );
            let session = Session::builder(config)
                .with_remote_store(remote.clone())
                .with_photo_store(Arc::new(MemoryPhotoStore::new()))
                .start()
                .await
                .unwrap();

            session.update_location(here()).await;
            session.pin().await.unwrap();
            session.add_location("Home").await.unwrap();
            first_user_id = session.user_id().to_string();
            session.shutdown().await;
        }

        // Second launch, same cache file, never goes online
        let remote = Arc::new(MemoryRemoteStore::new());
        let config = SessionConfig::new(DbConfig::new(&db_path), SyncConfig::default());
        let session = Session::builder(config)
            .with_remote_store(remote.clone())
            .with_photo_store(Arc::new(MemoryPhotoStore::new()))
            .start()
            .await
            .unwrap();

        assert_eq!(session.status().await, ParkingStatus::ActiveNoPhoto);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.parking_location, Some(here()));
        assert_eq!(snapshot.saved_locations.len(), 1);

        // Same device identity across restarts
        assert_eq!(session.user_id(), first_user_id);

        // Not a single network call on the cold-start path
        assert_eq!(remote.list_calls(), 0);
        assert_eq!(remote.create_calls(), 0);
    }

    // =========================================================================
    // Parking Lifecycle
    // =========================================================================

    #[tokio::test]
    async fn test_pin_without_fix_is_a_logged_no_op() {
        let (session, _, _) = memory_session().await;
        session.pin().await.unwrap();
        assert_eq!(session.status().await, ParkingStatus::None);
    }

    #[tokio::test]
    async fn test_pin_clear_archives_and_deactivates_remotely() {
        let (session, remote, _) = memory_session().await;
        go_online(&session).await;

        session.update_location(Coordinates::new(1.0, 1.0)).await;
        session.pin().await.unwrap();
        session.update_location(Coordinates::new(2.0, 2.0)).await;
        session.pin().await.unwrap();
        session.clear().await.unwrap();
        session.sync_barrier().await.unwrap();

        // History: newest first, B then A
        let history = session.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].location, Coordinates::new(2.0, 2.0));
        assert_eq!(history[1].location, Coordinates::new(1.0, 1.0));
        assert_eq!(session.status().await, ParkingStatus::None);

        // One remote parking record through the whole sequence, now retired
        let records = remote.records_for(session.user_id());
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_active);
        assert_eq!(remote.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_repin_after_clear_reuses_the_remote_record() {
        let (session, remote, _) = memory_session().await;
        go_online(&session).await;

        session.update_location(here()).await;
        session.pin().await.unwrap();
        session.clear().await.unwrap();
        session.pin().await.unwrap();
        session.sync_barrier().await.unwrap();

        let records = remote.records_for(session.user_id());
        assert_eq!(records.len(), 1);
        assert!(records[0].is_active);
        assert_eq!(remote.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_attach_photo_is_two_phase() {
        let (session, remote, photos) = memory_session().await;
        go_online(&session).await;

        session.update_location(here()).await;
        session.pin().await.unwrap();
        session
            .attach_photo(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap();

        // Phase 1 is already visible before any sync settles
        assert_eq!(session.status().await, ParkingStatus::ActiveWithPhoto);

        session.sync_barrier().await.unwrap();

        // Phase 2 swapped in the durable URL locally
        let snapshot = session.snapshot().await;
        assert!(snapshot.parking_photo.as_ref().unwrap().is_durable());
        assert_eq!(photos.upload_count(), 1);

        // The record push that ran at attach time carried the inline ref;
        // the durable URL reaches the record on the next parking push
        let records = remote.records_for(session.user_id());
        assert!(records[0].photo_url.as_ref().unwrap().starts_with("data:"));
    }

    #[tokio::test]
    async fn test_attach_photo_without_pin_is_rejected() {
        let (session, _, _) = memory_session().await;
        let err = session
            .attach_photo(vec![0xFF], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::NoActiveParking)
        ));
    }

    #[tokio::test]
    async fn test_restore_from_history_reenters_active() {
        let (session, _, _) = memory_session().await;

        session.update_location(here()).await;
        session.pin().await.unwrap();
        session.clear().await.unwrap();

        let entry_id = session.history().await[0].id.clone();
        session.restore_from_history(&entry_id).await.unwrap();

        assert_eq!(session.status().await, ParkingStatus::ActiveNoPhoto);
        assert_eq!(session.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_with_unknown_id_errors() {
        let (session, _, _) = memory_session().await;
        let err = session.restore_from_history("no-such-entry").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::HistoryEntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let (session, _, _) = memory_session().await;

        for i in 0..(HISTORY_CAPACITY + 3) {
            session
                .update_location(Coordinates::new(i as f64, i as f64))
                .await;
            session.pin().await.unwrap();
        }
        session.clear().await.unwrap();

        assert_eq!(session.history().await.len(), HISTORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_clear_history_empties_the_log() {
        let (session, _, _) = memory_session().await;

        session.update_location(here()).await;
        session.pin().await.unwrap();
        session.clear().await.unwrap();
        assert_eq!(session.history().await.len(), 1);

        session.clear_history().await.unwrap();
        assert!(session.history().await.is_empty());
    }

    // =========================================================================
    // Saved Places
    // =========================================================================

    #[tokio::test]
    async fn test_add_location_pushes_when_online() {
        let (session, remote, _) = memory_session().await;
        go_online(&session).await;

        session.update_location(here()).await;
        session.add_location("Home").await.unwrap();
        session.sync_barrier().await.unwrap();

        let saved = session.saved_locations().await;
        assert_eq!(saved.len(), 1);
        assert!(saved.as_slice()[0].is_synced());
        assert_eq!(remote.create_calls(), 1);
        assert_eq!(session.sync_status().await.pending_count, 0);
    }

    #[tokio::test]
    async fn test_add_location_rejects_empty_label() {
        let (session, _, _) = memory_session().await;
        session.update_location(here()).await;

        let err = session.add_location("   ").await.unwrap_err();
        assert!(matches!(err, SessionError::Core(_)));
        assert!(session.saved_locations().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_synced_location_deletes_remotely() {
        let (session, remote, _) = memory_session().await;
        go_online(&session).await;

        session.update_location(here()).await;
        session.add_location("Home").await.unwrap();
        session.sync_barrier().await.unwrap();

        let id = session.saved_locations().await.as_slice()[0].id.clone();
        session.delete_location(&id).await.unwrap();
        session.sync_barrier().await.unwrap();

        assert!(session.saved_locations().await.is_empty());
        assert_eq!(remote.delete_calls(), 1);
        assert!(remote.records_for(session.user_id()).is_empty());
    }

    #[tokio::test]
    async fn test_delete_unsynced_location_stays_local() {
        let (session, remote, _) = memory_session().await;

        // Offline: the pin never syncs, so its delete has no remote side
        session.update_location(here()).await;
        session.add_location("Home").await.unwrap();
        let id = session.saved_locations().await.as_slice()[0].id.clone();
        session.delete_location(&id).await.unwrap();

        go_online(&session).await;

        assert_eq!(remote.create_calls(), 0);
        assert_eq!(remote.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_location_is_ignored() {
        let (session, _, _) = memory_session().await;
        session
            .delete_location(&PinId::remote("rec-ghost"))
            .await
            .unwrap();
    }

    // =========================================================================
    // Offline / Reconnect
    // =========================================================================

    #[tokio::test]
    async fn test_offline_mutations_flush_once_on_reconnect() {
        trace_init();
        let (session, remote, _) = memory_session().await;

        // Everything below happens offline
        session.update_location(Coordinates::new(37.75, -122.45)).await;
        session.add_location("Home").await.unwrap();
        session.update_location(here()).await;
        session.pin().await.unwrap();

        assert_eq!(remote.create_calls(), 0);
        assert_eq!(session.sync_status().await.pending_count, 1);

        go_online(&session).await;

        // Exactly one create for the saved place, one for the parking pin
        assert_eq!(remote.create_calls(), 2);
        let records = remote.records_for(session.user_id());
        let parking: Vec<_> = records.iter().filter(|r| r.is_active_parking()).collect();
        assert_eq!(parking.len(), 1);

        // Local ids were rewritten by the flush (and confirmed by the pull)
        assert!(session.saved_locations().await.as_slice()[0].is_synced());
        assert_eq!(session.sync_status().await.pending_count, 0);
    }

    #[tokio::test]
    async fn test_first_online_pull_adopts_remote_state() {
        let (session, remote, _) = memory_session().await;

        // Another device already parked and saved a place
        remote.insert_record(
            session.user_id(),
            parkpin_sync::RemoteRecord {
                id: "rec-100".to_string(),
                latitude: 40.0,
                longitude: -74.0,
                label: "My Car".to_string(),
                category: parkpin_core::Category::Parking,
                is_active: true,
                photo_url: None,
                timestamp: chrono::Utc::now(),
                synced_at: Some(chrono::Utc::now()),
            },
        );
        remote.insert_record(
            session.user_id(),
            parkpin_sync::RemoteRecord {
                id: "rec-101".to_string(),
                latitude: 40.1,
                longitude: -74.1,
                label: "Office".to_string(),
                category: parkpin_core::Category::Custom,
                is_active: false,
                photo_url: None,
                timestamp: chrono::Utc::now(),
                synced_at: Some(chrono::Utc::now()),
            },
        );

        go_online(&session).await;

        assert_eq!(session.status().await, ParkingStatus::ActiveNoPhoto);
        let saved = session.saved_locations().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.as_slice()[0].label, "Office");
    }

    #[tokio::test]
    async fn test_push_failure_keeps_local_state_and_reports() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let emitter_probe = Arc::new(CountingEmitter::new());
        let session = Session::builder(SessionConfig::in_memory())
            .with_remote_store(remote.clone())
            .with_photo_store(Arc::new(MemoryPhotoStore::new()))
            .with_emitter(emitter_probe.clone())
            .start()
            .await
            .unwrap();
        go_online(&session).await;

        remote.set_failing(true);
        session.update_location(here()).await;
        session.add_location("Home").await.unwrap();
        session.sync_barrier().await.unwrap();

        // Local mutation survives the failed push
        let saved = session.saved_locations().await;
        assert_eq!(saved.len(), 1);
        assert!(!saved.as_slice()[0].is_synced());
        assert!(session.sync_status().await.last_error.is_some());
        assert!(emitter_probe.errors.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_emitter_sees_every_committed_mutation() {
        let emitter = Arc::new(CountingEmitter::new());
        let session = Session::builder(SessionConfig::in_memory())
            .with_remote_store(Arc::new(MemoryRemoteStore::new()))
            .with_photo_store(Arc::new(MemoryPhotoStore::new()))
            .with_emitter(emitter.clone())
            .start()
            .await
            .unwrap();

        let after_startup = emitter.state_events.load(Ordering::SeqCst);
        session.update_location(here()).await;
        session.pin().await.unwrap();
        session.clear().await.unwrap();

        assert_eq!(
            emitter.state_events.load(Ordering::SeqCst),
            after_startup + 2
        );
    }

    // =========================================================================
    // Distance
    // =========================================================================

    #[tokio::test]
    async fn test_distance_readout() {
        let (session, _, _) = memory_session().await;

        session.update_location(Coordinates::new(0.0, 0.0)).await;
        session.pin().await.unwrap();
        assert_eq!(session.distance_to_parking().await, Some(0.0));

        session.update_location(Coordinates::new(0.0, 1.0)).await;
        assert_eq!(session.distance_to_parking().await, Some(69.1));
    }

    #[tokio::test]
    async fn test_invalid_position_sample_is_dropped() {
        let (session, _, _) = memory_session().await;

        session.update_location(Coordinates::new(91.0, 0.0)).await;
        session.pin().await.unwrap();

        // The bad sample never landed, so pin had no fix to work with
        assert_eq!(session.status().await, ParkingStatus::None);
    }
}
