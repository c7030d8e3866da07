//! # parkpin-session: Offline-First Session Orchestration for ParkPin
//!
//! The top of the stack: one [`Session`] per running app. It restores state
//! from the local cache before any network I/O, serves every command from
//! memory, and keeps a background worker settling the remote side whenever
//! the device is online.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Layer Architecture                         │
//! │                                                                         │
//! │   Frontend commands                 Platform signals                    │
//! │   pin / clear / attach_photo        update_location (GPS)              │
//! │   add / delete / restore            set_online / set_offline           │
//! │            │                               │                            │
//! │            ▼                               ▼                            │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                            Session                               │  │
//! │  │                                                                  │  │
//! │  │   1. mutate ParkingState      (in-memory, behind RwLock)         │  │
//! │  │   2. persist CacheSnapshot    (parkpin-db, awaited)              │  │
//! │  │   3. emit state_changed       (SessionEventEmitter)              │  │
//! │  │   4. enqueue SyncJob          (online only, fire-and-forget)     │  │
//! │  └───────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │ mpsc                                 │
//! │                                  ▼                                      │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                          SyncWorker                              │  │
//! │  │                                                                  │  │
//! │  │   single task, jobs in order; on reconnect: flush, then pull     │  │
//! │  │   applies id reassignments / pull results back to state + cache  │  │
//! │  └───────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                     SyncEngine  (parkpin-sync)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`session`] - `Session` facade and `SessionBuilder`
//! - [`state`] - `ParkingState`: the in-memory state machine
//! - [`worker`] - `SyncWorker`: background job loop
//! - [`events`] - `SessionEventEmitter` trait for frontend notification
//! - [`config`] - `SessionConfig`: cache path + sync settings
//! - [`error`] - `SessionError`: what surfaces from commands
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parkpin_session::{Session, SessionConfig};
//!
//! let session = Session::start(SessionConfig::load_or_default()).await?;
//!
//! // Renders instantly from the cache, before any network call
//! let snapshot = session.snapshot().await;
//!
//! // GPS samples and connectivity come from the platform
//! session.update_location(position).await;
//! session.set_online();           // triggers flush-then-pull
//!
//! session.pin().await?;           // park the car
//! session.clear().await?;         // found it; archived to history
//!
//! session.shutdown().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod state;
pub mod worker;

// =============================================================================
// Re-exports
// =============================================================================

// Facade
pub use session::{Session, SessionBuilder};

// Configuration + errors
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};

// Events
pub use events::{NoOpEmitter, SessionEventEmitter};

// State machine + worker (exposed for embedders that compose their own)
pub use state::ParkingState;
pub use worker::{SyncJob, SyncWorker, SyncWorkerHandle};
