//! # Repository Module
//!
//! Cache repository implementations for ParkPin.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts cache access behind a clean API.      │
//! │                                                                         │
//! │  Session Command                                                        │
//! │       │                                                                 │
//! │       │  db.snapshots().save(&snapshot)                                 │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SnapshotRepository                                                     │
//! │  ├── save(&self, snapshot)   - atomic whole-document UPSERT             │
//! │  ├── load(&self)             - None on first run                        │
//! │  └── clear(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  cache_entries (key → value)                                            │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                         │
//! │  • Serialization happens at exactly one boundary                        │
//! │  • The session never sees keys or JSON, only domain types               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`snapshot::SnapshotRepository`] - The full state snapshot document
//! - [`history::HistoryRepository`] - The bounded parking history log
//! - [`identity::IdentityRepository`] - The persisted device user identity

pub mod history;
pub mod identity;
pub mod snapshot;
