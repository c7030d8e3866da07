//! # Background Sync Worker
//!
//! Single consumer of all remote work. Commands enqueue jobs and return
//! immediately; this worker runs them one at a time and applies whatever
//! comes back (pulled records, id reassignments, durable photo URLs) to the
//! in-memory state and the cache.
//!
//! ## Job Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sync Worker Loop                                │
//! │                                                                         │
//! │  Session commands ──► mpsc queue ──┐                                    │
//! │                                    │                                    │
//! │  Connectivity watch ───────────────┤   ┌──────────────────────────────┐ │
//! │  (offline → online:                ├──►│ select! (biased)             │ │
//! │   flush, then pull)                │   │  1. shutdown                 │ │
//! │                                    │   │  2. connectivity transition  │ │
//! │  Shutdown leash ───────────────────┘   │  3. next job                 │ │
//! │                                        └──────────────┬───────────────┘ │
//! │                                                       │                 │
//! │          completions mutate state, write the cache,   │                 │
//! │          update SyncStatus, notify the emitter  ◄─────┘                 │
//! │                                                                         │
//! │  One worker per session. Jobs never run concurrently, which is what    │
//! │  makes flush-then-pull on reconnect a real ordering guarantee.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every job is fire-and-forget from the command's point of view: a failure
//! lands in `SyncStatus.last_error` and the emitter, never back in the
//! command that scheduled it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, error, info, warn};

use parkpin_core::{ActiveParking, Coordinates, PhotoRef, PinId};
use parkpin_db::SnapshotRepository;
use parkpin_sync::{ConnectionState, Connectivity, SyncEngine, SyncStatus};

use crate::error::{SessionError, SessionResult};
use crate::events::SessionEventEmitter;
use crate::state::ParkingState;

/// Queue depth for pending sync jobs.
const JOB_QUEUE_CAPACITY: usize = 64;

// =============================================================================
// Sync Jobs
// =============================================================================

/// One unit of remote work.
#[derive(Debug)]
pub enum SyncJob {
    /// Push the parking pin (update-else-create).
    PushParking {
        position: Coordinates,
        photo: Option<PhotoRef>,
    },

    /// Retire the remote parking record after a clear.
    DeactivateParking,

    /// Create remote records for saved places still carrying local ids.
    PushSaved,

    /// Delete a saved place's remote record.
    DeleteSaved { id: PinId },

    /// Upload photo bytes; on completion the durable URL replaces the
    /// inline reference in state and cache.
    UploadPhoto {
        bytes: Vec<u8>,
        content_type: String,
    },

    /// Fetch the remote collection and replace local parking + saved state.
    Pull,

    /// Push everything created offline: unsynced saved places, then the
    /// parking pin if one is active.
    Flush,

    /// Replies once every job ahead of it has finished. Gives shutdown and
    /// tests a quiescence point.
    Barrier { done: oneshot::Sender<()> },
}

impl SyncJob {
    /// Short name for log fields.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            SyncJob::PushParking { .. } => "push-parking",
            SyncJob::DeactivateParking => "deactivate-parking",
            SyncJob::PushSaved => "push-saved",
            SyncJob::DeleteSaved { .. } => "delete-saved",
            SyncJob::UploadPhoto { .. } => "upload-photo",
            SyncJob::Pull => "pull",
            SyncJob::Flush => "flush",
            SyncJob::Barrier { .. } => "barrier",
        }
    }
}

// =============================================================================
// Worker Handle
// =============================================================================

/// Handle for feeding jobs to a running worker.
#[derive(Clone)]
pub struct SyncWorkerHandle {
    job_tx: mpsc::Sender<SyncJob>,
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncWorkerHandle {
    /// Enqueues a job. Fails only once the worker is gone.
    pub async fn enqueue(&self, job: SyncJob) -> SessionResult<()> {
        self.job_tx
            .send(job)
            .await
            .map_err(|_| SessionError::ShuttingDown)
    }

    /// Waits until every previously enqueued job has finished.
    pub async fn barrier(&self) -> SessionResult<()> {
        let (done, done_rx) = oneshot::channel();
        self.enqueue(SyncJob::Barrier { done }).await?;
        done_rx.await.map_err(|_| SessionError::ShuttingDown)
    }

    /// Signals the worker to stop after its current job.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

// =============================================================================
// Sync Worker
// =============================================================================

/// The background task behind a session's remote side.
pub struct SyncWorker {
    engine: SyncEngine,
    state: Arc<RwLock<ParkingState>>,
    snapshots: SnapshotRepository,
    status: Arc<RwLock<SyncStatus>>,
    emitter: Arc<dyn SessionEventEmitter>,
    connectivity: Connectivity,
    job_rx: mpsc::Receiver<SyncJob>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl SyncWorker {
    /// Creates a worker and its handle. The worker does nothing until
    /// [`run`](SyncWorker::run) is spawned.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: SyncEngine,
        state: Arc<RwLock<ParkingState>>,
        snapshots: SnapshotRepository,
        status: Arc<RwLock<SyncStatus>>,
        emitter: Arc<dyn SessionEventEmitter>,
        connectivity: Connectivity,
    ) -> (Self, SyncWorkerHandle) {
        let (job_tx, job_rx) = mpsc::channel(JOB_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = SyncWorker {
            engine,
            state,
            snapshots,
            status,
            emitter,
            connectivity,
            job_rx,
            shutdown_rx,
        };

        let handle = SyncWorkerHandle {
            job_tx,
            shutdown_tx,
        };

        (worker, handle)
    }

    /// Runs the worker loop.
    ///
    /// This should be spawned as a background task. The `biased` poll order
    /// makes a connectivity transition visible before any job enqueued
    /// after it, so a barrier behind `set_online()` also waits for the
    /// reconnect flush and pull.
    pub async fn run(mut self) {
        info!("Sync worker starting");

        let mut connectivity_rx = self.connectivity.subscribe();
        let mut online = connectivity_rx.borrow().is_online();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("Sync worker shutting down");
                    break;
                }

                Ok(()) = connectivity_rx.changed() => {
                    let now_online = connectivity_rx.borrow_and_update().is_online();
                    if now_online != online {
                        online = now_online;
                        self.on_connectivity_change(now_online).await;
                    }
                }

                Some(job) = self.job_rx.recv() => {
                    debug!(job = job.describe(), "Processing sync job");
                    self.handle_job(job).await;
                }
            }
        }

        info!("Sync worker stopped");
    }

    // =========================================================================
    // Connectivity Transitions
    // =========================================================================

    async fn on_connectivity_change(&self, online: bool) {
        let connection_state = if online {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        };
        self.refresh_status(|s| s.connection_state = connection_state)
            .await;

        if online {
            info!("Back online, flushing local work before pulling");
            self.flush().await;
            self.pull().await;
        } else {
            info!("Connection lost, staying on cached state");
        }
    }

    // =========================================================================
    // Job Dispatch
    // =========================================================================

    async fn handle_job(&self, job: SyncJob) {
        match job {
            SyncJob::PushParking { position, photo } => {
                self.push_parking(position, photo).await;
            }
            SyncJob::DeactivateParking => self.deactivate_parking().await,
            SyncJob::PushSaved => self.push_saved().await,
            SyncJob::DeleteSaved { id } => self.delete_saved(&id).await,
            SyncJob::UploadPhoto {
                bytes,
                content_type,
            } => self.upload_photo(bytes, &content_type).await,
            SyncJob::Pull => self.pull().await,
            SyncJob::Flush => self.flush().await,
            SyncJob::Barrier { done } => {
                let _ = done.send(());
            }
        }
    }

    async fn push_parking(&self, position: Coordinates, photo: Option<PhotoRef>) {
        match self.engine.push_parking(position, photo.as_ref()).await {
            Ok(()) => self.note_push_success().await,
            Err(e) => self.note_failure("Parking push", &e.to_string(), e.is_retryable()).await,
        }
    }

    async fn deactivate_parking(&self) {
        match self.engine.deactivate_parking().await {
            Ok(()) => self.note_push_success().await,
            Err(e) => {
                self.note_failure("Parking deactivation", &e.to_string(), e.is_retryable())
                    .await
            }
        }
    }

    /// Creates remote records for unsynced saved places and rewrites their
    /// ids in state and cache.
    async fn push_saved(&self) {
        let saved = { self.state.read().await.saved.clone() };
        if saved.unsynced_count() == 0 {
            debug!("No unsynced saved locations");
            return;
        }

        let outcome = self.engine.push_saved(&saved).await;

        if !outcome.reassignments.is_empty() {
            let pending = {
                let mut state = self.state.write().await;
                for r in &outcome.reassignments {
                    if !state.saved.mark_synced(&r.local, r.remote.clone(), r.synced_at) {
                        // Deleted locally while its create was in flight
                        debug!(local = %r.local, "Reassignment for a pin that is gone");
                    }
                }
                state.saved.unsynced_count()
            };
            self.persist_and_emit().await;
            self.refresh_status(|s| {
                s.pending_count = pending;
                s.last_push = Some(Utc::now());
                s.last_error = None;
            })
            .await;
        }

        if let Some((_, e)) = outcome.failures.into_iter().next() {
            self.note_failure("Saved location push", &e.to_string(), e.is_retryable())
                .await;
        }
    }

    async fn delete_saved(&self, id: &PinId) {
        match self.engine.delete_saved(id).await {
            Ok(()) => self.note_push_success().await,
            Err(e) => {
                self.note_failure("Saved location delete", &e.to_string(), e.is_retryable())
                    .await
            }
        }
    }

    /// Runs the second phase of photo attachment: upload the bytes, then
    /// swap the inline reference for the durable URL in state and cache.
    /// The remote record picks the URL up on the next parking push.
    async fn upload_photo(&self, bytes: Vec<u8>, content_type: &str) {
        let photo = match self.engine.upload_photo(bytes, content_type).await {
            Ok(photo) => photo,
            Err(e) => {
                warn!(error = %e, "Photo upload failed, keeping inline photo");
                self.note_failure("Photo upload", &e.to_string(), e.is_retryable())
                    .await;
                return;
            }
        };

        let applied = {
            let mut state = self.state.write().await;
            match &mut state.active {
                Some(active) => {
                    active.photo = Some(photo);
                    true
                }
                // Pin cleared while the upload was in flight
                None => false,
            }
        };

        if applied {
            self.persist_and_emit().await;
        } else {
            debug!("Upload finished after the pin was cleared, discarding URL");
        }
    }

    /// Replaces parking + saved state with the remote view.
    async fn pull(&self) {
        self.refresh_status(|s| s.is_syncing = true).await;

        match self.engine.pull().await {
            Ok(outcome) => {
                let pending = {
                    let mut state = self.state.write().await;
                    state.saved = outcome.saved;
                    state.active = outcome.parking.map(|p| ActiveParking {
                        location: p.position,
                        photo: p.photo,
                        pinned_at: p.pinned_at,
                    });
                    state.saved.unsynced_count()
                };
                self.persist_and_emit().await;
                self.refresh_status(|s| {
                    s.is_syncing = false;
                    s.last_pull = Some(Utc::now());
                    s.pending_count = pending;
                    s.last_error = None;
                })
                .await;
            }
            Err(e) => {
                warn!(error = %e, "Pull failed, keeping cached state");
                self.refresh_status(|s| s.is_syncing = false).await;
                self.note_failure("Pull", &e.to_string(), e.is_retryable()).await;
            }
        }
    }

    /// Pushes everything created offline: saved places first, then the
    /// parking pin if one is active.
    async fn flush(&self) {
        self.refresh_status(|s| s.is_syncing = true).await;

        self.push_saved().await;

        let parking = {
            let state = self.state.read().await;
            state.active.as_ref().map(|a| (a.location, a.photo.clone()))
        };
        if let Some((position, photo)) = parking {
            self.push_parking(position, photo).await;
        }

        self.refresh_status(|s| s.is_syncing = false).await;
    }

    // =========================================================================
    // State & Status Plumbing
    // =========================================================================

    /// Writes the current snapshot to the cache and notifies the frontend.
    async fn persist_and_emit(&self) {
        let snapshot = { self.state.read().await.snapshot() };

        if let Err(e) = self.snapshots.save(&snapshot).await {
            // Memory already moved on; all we can do is surface it
            error!(error = %e, "Cache write from sync worker failed");
            self.refresh_status(|s| s.last_error = Some(e.to_string()))
                .await;
        }

        self.emitter.state_changed(&snapshot);
    }

    /// Mutates the shared status under its lock, then emits the new value.
    async fn refresh_status<F: FnOnce(&mut SyncStatus)>(&self, f: F) {
        let status = {
            let mut status = self.status.write().await;
            f(&mut status);
            status.clone()
        };
        self.emitter.sync_changed(&status);
    }

    async fn note_push_success(&self) {
        self.refresh_status(|s| {
            s.last_push = Some(Utc::now());
            s.last_error = None;
        })
        .await;
    }

    async fn note_failure(&self, what: &str, message: &str, retryable: bool) {
        warn!(error = message, "{} failed", what);
        let text = format!("{}: {}", what, message);
        self.refresh_status(|s| s.last_error = Some(text.clone())).await;
        self.emitter.sync_error(&text, retryable);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEmitter;
    use parkpin_core::LocationPin;
    use parkpin_db::{Database, DbConfig};
    use parkpin_sync::{MemoryPhotoStore, MemoryRemoteStore};

    const USER: &str = "user-worker-test";

    struct Harness {
        handle: SyncWorkerHandle,
        state: Arc<RwLock<ParkingState>>,
        remote: Arc<MemoryRemoteStore>,
        photos: Arc<MemoryPhotoStore>,
        status: Arc<RwLock<SyncStatus>>,
        snapshots: SnapshotRepository,
        connectivity: Connectivity,
    }

    async fn harness(initial: ConnectionState) -> Harness {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snapshots = db.snapshots();

        let remote = Arc::new(MemoryRemoteStore::new());
        let photos = Arc::new(MemoryPhotoStore::new());
        let engine = SyncEngine::new(remote.clone(), photos.clone(), USER.to_string());

        let state = Arc::new(RwLock::new(ParkingState::new()));
        let status = Arc::new(RwLock::new(SyncStatus::default()));
        let connectivity = Connectivity::new(initial);

        let (worker, handle) = SyncWorker::new(
            engine,
            state.clone(),
            snapshots.clone(),
            status.clone(),
            Arc::new(NoOpEmitter),
            connectivity.clone(),
        );
        tokio::spawn(worker.run());

        Harness {
            handle,
            state,
            remote,
            photos,
            status,
            snapshots,
            connectivity,
        }
    }

    #[tokio::test]
    async fn test_barrier_waits_for_queued_jobs() {
        let h = harness(ConnectionState::Online).await;

        h.handle
            .enqueue(SyncJob::PushParking {
                position: Coordinates::new(37.0, -122.0),
                photo: None,
            })
            .await
            .unwrap();
        h.handle.barrier().await.unwrap();

        assert_eq!(h.remote.records_for(USER).len(), 1);
    }

    #[tokio::test]
    async fn test_push_saved_rewrites_ids_in_state_and_cache() {
        let h = harness(ConnectionState::Online).await;
        {
            let mut state = h.state.write().await;
            state.add_saved(LocationPin::custom(
                "Home",
                Coordinates::new(37.75, -122.45),
            ));
        }

        h.handle.enqueue(SyncJob::PushSaved).await.unwrap();
        h.handle.barrier().await.unwrap();

        let state = h.state.read().await;
        assert!(state.saved.as_slice()[0].is_synced());

        // The cache saw the rewritten id too
        let cached = h.snapshots.load().await.unwrap().unwrap();
        assert!(cached.saved_locations.as_slice()[0].is_synced());

        let status = h.status.read().await;
        assert_eq!(status.pending_count, 0);
        assert!(status.last_push.is_some());
    }

    #[tokio::test]
    async fn test_pull_replaces_state_and_cache() {
        let h = harness(ConnectionState::Online).await;

        // Push one pin up, then pull the remote view back down
        {
            let mut state = h.state.write().await;
            state.add_saved(LocationPin::custom(
                "Work",
                Coordinates::new(37.79, -122.40),
            ));
        }
        h.handle.enqueue(SyncJob::PushSaved).await.unwrap();
        h.handle.enqueue(SyncJob::Pull).await.unwrap();
        h.handle.barrier().await.unwrap();

        let state = h.state.read().await;
        assert_eq!(state.saved.len(), 1);
        assert!(state.saved.as_slice()[0].is_synced());
        assert!(state.active.is_none());

        let status = h.status.read().await;
        assert!(status.last_pull.is_some());
        assert!(!status.is_syncing);
    }

    #[tokio::test]
    async fn test_failed_push_lands_in_status_not_state() {
        let h = harness(ConnectionState::Online).await;
        h.remote.set_failing(true);
        {
            let mut state = h.state.write().await;
            state.add_saved(LocationPin::custom(
                "Home",
                Coordinates::new(37.75, -122.45),
            ));
        }

        h.handle.enqueue(SyncJob::PushSaved).await.unwrap();
        h.handle.barrier().await.unwrap();

        let state = h.state.read().await;
        // Still local, eligible for the next flush
        assert!(!state.saved.as_slice()[0].is_synced());

        let status = h.status.read().await;
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_upload_replaces_inline_photo_with_durable_url() {
        let h = harness(ConnectionState::Online).await;
        {
            let mut state = h.state.write().await;
            state.pin(Coordinates::new(37.0, -122.0));
            state
                .attach_photo(PhotoRef::Inline("data:image/jpeg;base64,AA".into()))
                .unwrap();
        }

        h.handle
            .enqueue(SyncJob::UploadPhoto {
                bytes: vec![0xFF, 0xD8],
                content_type: "image/jpeg".to_string(),
            })
            .await
            .unwrap();
        h.handle.barrier().await.unwrap();

        let state = h.state.read().await;
        let photo = state.active.as_ref().unwrap().photo.as_ref().unwrap();
        assert!(photo.is_durable());

        let cached = h.snapshots.load().await.unwrap().unwrap();
        assert!(cached.parking_photo.as_ref().unwrap().is_durable());
    }

    #[tokio::test]
    async fn test_upload_after_clear_discards_url() {
        let h = harness(ConnectionState::Online).await;

        h.handle
            .enqueue(SyncJob::UploadPhoto {
                bytes: vec![0xFF, 0xD8],
                content_type: "image/jpeg".to_string(),
            })
            .await
            .unwrap();
        h.handle.barrier().await.unwrap();

        assert_eq!(h.photos.upload_count(), 1);
        assert!(h.state.read().await.active.is_none());
    }

    #[tokio::test]
    async fn test_reconnect_flushes_then_pulls() {
        let h = harness(ConnectionState::Offline).await;
        {
            let mut state = h.state.write().await;
            state.add_saved(LocationPin::custom(
                "Home",
                Coordinates::new(37.75, -122.45),
            ));
            state.pin(Coordinates::new(37.0, -122.0));
        }

        h.connectivity.set_online();
        h.handle.barrier().await.unwrap();

        // Flush created the saved place and the parking record exactly once
        assert_eq!(h.remote.create_calls(), 2);
        let state = h.state.read().await;
        assert!(state.saved.as_slice()[0].is_synced());
        assert!(state.active.is_some());

        let status = h.status.read().await;
        assert!(status.is_online());
        assert!(status.last_pull.is_some());
        assert_eq!(status.pending_count, 0);
    }

    #[tokio::test]
    async fn test_going_offline_only_updates_status() {
        let h = harness(ConnectionState::Online).await;

        h.connectivity.set_offline();
        h.handle.barrier().await.unwrap();

        let status = h.status.read().await;
        assert!(!status.is_online());
        assert_eq!(h.remote.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_flush_with_nothing_local_is_quiet() {
        let h = harness(ConnectionState::Online).await;

        h.handle.enqueue(SyncJob::Flush).await.unwrap();
        h.handle.barrier().await.unwrap();

        assert_eq!(h.remote.create_calls(), 0);
        assert_eq!(h.remote.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_worker() {
        let h = harness(ConnectionState::Online).await;

        h.handle.shutdown().await;

        // Whether the loop has exited yet or not, the barrier cannot
        // complete: either the send fails or the reply sender is dropped.
        let result = h.handle.barrier().await;
        assert!(result.is_err());
    }
}
