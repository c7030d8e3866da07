//! # parkpin-core: Pure Domain Logic for ParkPin
//!
//! This crate is the **heart** of ParkPin. It contains all domain logic for
//! the "where did I park?" state model as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ParkPin Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (map UI)                            │   │
//! │  │    Map view ──► Pin card ──► History list ──► Saved places     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands + events                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 parkpin-session (state machine)                 │   │
//! │  │    pin_car, clear_parking, attach_photo, add_location, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ parkpin-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │    geo    │  │  history  │  │ validation│  │   │
//! │  │   │  PinId    │  │Coordinates│  │  Parking  │  │   rules   │  │   │
//! │  │   │ Snapshot  │  │ haversine │  │  History  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          parkpin-db (cache) / parkpin-sync (remote)             │   │
//! │  │        SQLite snapshot store, REST remote store adapter         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PinId, LocationPin, CacheSnapshot, etc.)
//! - [`geo`] - Coordinates and great-circle distance in miles
//! - [`history`] - The bounded, newest-first parking history log
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules for labels and coordinates
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Local-first ids**: Records minted offline get a `local-` id that a later
//!    sync push replaces with the backend-assigned one
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use parkpin_core::geo::{distance_miles, Coordinates};
//!
//! let car = Coordinates::new(37.7793, -122.4192);
//! let me = Coordinates::new(37.7810, -122.4110);
//!
//! // Distances are rounded to one decimal, ready for display
//! let miles = distance_miles(me, car);
//! assert_eq!(miles, 0.5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod geo;
pub mod history;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use parkpin_core::CacheSnapshot` instead of
// `use parkpin_core::types::CacheSnapshot`

pub use error::{CoreError, CoreResult, ValidationError};
pub use geo::{distance_miles, Coordinates};
pub use history::{HistoryEntry, ParkingHistory};
pub use types::*;
pub use validation::{validate_coordinates, validate_label, ValidationResult};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of entries kept in the parking history log.
///
/// The history is a convenience trail ("where was I parked before?"), not an
/// archive. Every insert trims the log back to this bound, newest first.
pub const HISTORY_CAPACITY: usize = 5;

/// Label written on the remote parking record when one is created.
///
/// A user has exactly one car record; the label is fixed so the
/// update-else-create reconciliation can always target the same record.
pub const PARKING_LABEL: &str = "My Car";

/// Maximum length of a saved-location label, in characters.
pub const MAX_LABEL_LENGTH: usize = 80;

/// Prefix that marks a pin id as locally minted and not yet synced.
///
/// Records created offline carry a `local-<uuid>` id until a sync push
/// creates the remote record and reports the durable id back.
pub const LOCAL_ID_PREFIX: &str = "local-";
