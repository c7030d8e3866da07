//! # parkpin-sync: Remote Sync Layer for ParkPin
//!
//! This crate reconciles device-local parking state with the per-user remote
//! collection, enabling offline-first operation: every command lands locally
//! first, and this layer settles the remote side when connectivity allows.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Layer Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    SyncEngine (Reconciliation)                   │  │
//! │  │                                                                  │  │
//! │  │  pull            list records, partition into saved + parking   │  │
//! │  │  push_parking    update-else-create against the car record      │  │
//! │  │  deactivate      retire the car record after a clear            │  │
//! │  │  push_saved      create records for local- ids, report new ids  │  │
//! │  │  delete_saved    remote delete (skipped for never-synced pins)  │  │
//! │  │  upload_photo    bytes → durable URL                            │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┴─────────────────────┐                  │
//! │         ▼                                           ▼                   │
//! │  ┌────────────────────────┐              ┌────────────────────────┐    │
//! │  │ RemoteStore (trait)    │              │ PhotoStore (trait)     │    │
//! │  │                        │              │                        │    │
//! │  │ RestRemoteStore        │              │ RestPhotoStore         │    │
//! │  │   per-user collection  │              │   POST bytes, get URL  │    │
//! │  │ MemoryRemoteStore      │              │ MemoryPhotoStore       │    │
//! │  │   in-process test dbl  │              │   in-process test dbl  │    │
//! │  └────────────────────────┘              └────────────────────────┘    │
//! │                                                                         │
//! │  ┌────────────────────────┐              ┌────────────────────────┐    │
//! │  │ Connectivity           │              │ SyncConfig             │    │
//! │  │                        │              │                        │    │
//! │  │ watch-channel handle   │              │ TOML + env overrides   │    │
//! │  │ for online/offline     │              │ remote + photo URLs    │    │
//! │  └────────────────────────┘              └────────────────────────┘    │
//! │                                                                         │
//! │  This crate never touches the local cache. Pull outcomes and id        │
//! │  reassignments go back to the session layer, which applies them to    │
//! │  in-memory state and the cache.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`engine`] - `SyncEngine` reconciliation and `SyncStatus`
//! - [`remote`] - `RemoteStore` trait, REST client, wire types
//! - [`photos`] - `PhotoStore` trait, inline data-URL encoding
//! - [`connectivity`] - Online/offline signal as a watch channel
//! - [`config`] - Sync configuration (remote URL, timeouts, toggle)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parkpin_sync::{RestPhotoStore, RestRemoteStore, SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::load_or_default(None);
//! let engine = SyncEngine::new(
//!     Arc::new(RestRemoteStore::new(&config)?),
//!     Arc::new(RestPhotoStore::new(&config)?),
//!     user_id,
//! );
//!
//! // Startup: remote wins
//! let outcome = engine.pull().await?;
//!
//! // Reconnect: flush local work first, then pull
//! let flushed = engine.push_saved(&saved).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod photos;
pub mod remote;

// =============================================================================
// Re-exports
// =============================================================================

// Reconciliation
pub use engine::{
    IdReassignment, PullOutcome, RemoteParking, SavedPushOutcome, SyncEngine, SyncStatus,
};

// Remote collection
pub use remote::memory::MemoryRemoteStore;
pub use remote::rest::RestRemoteStore;
pub use remote::{RecordDraft, RecordPatch, RemoteRecord, RemoteStore};

// Photo storage
pub use photos::{inline_photo, MemoryPhotoStore, PhotoStore, RestPhotoStore};

// Connectivity + configuration
pub use config::{PhotoSettings, RemoteSettings, SyncConfig, SyncSettings};
pub use connectivity::{ConnectionState, Connectivity};

// Errors
pub use error::{SyncError, SyncResult};
