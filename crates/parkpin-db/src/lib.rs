//! # parkpin-db: Local Cache Layer for ParkPin
//!
//! This crate provides the on-device cache for ParkPin. It uses SQLite for
//! local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ParkPin Offline-First Flow                         │
//! │                                                                         │
//! │  Session Command (pin_car, add_location, ...)                           │
//! │       │                                                                 │
//! │       │  1. mutate in-memory state                                      │
//! │       │  2. save snapshot  ◄── ALWAYS, before any network push          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    parkpin-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │   │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations  │    │   │
//! │  │   │   (pool.rs)   │   │                │   │  (embedded)  │    │   │
//! │  │   │               │   │ SnapshotRepo   │   │              │    │   │
//! │  │   │ SqlitePool    │◄──│ HistoryRepo    │   │ 001_init.sql │    │   │
//! │  │   │ WAL mode      │   │ IdentityRepo   │   │              │    │   │
//! │  │   └───────────────┘   └────────────────┘   └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cache_entries table, one row per logical document:                    │
//! │    'state'    → CacheSnapshot (JSON)                                   │
//! │    'history'  → ParkingHistory (JSON array)                            │
//! │    'user_id'  → device user identity (plain string)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Snapshot, history, and identity repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parkpin_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/parkpin.db");
//! let db = Database::new(config).await?;
//!
//! // Cold-start render path: load the cached snapshot (no network)
//! let snapshot = db.snapshots().load().await?;
//!
//! // Persist after a mutation
//! db.snapshots().save(&snapshot).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::history::HistoryRepository;
pub use repository::identity::IdentityRepository;
pub use repository::snapshot::SnapshotRepository;
