//! # Domain Types
//!
//! Core domain types used throughout ParkPin.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  LocationPin    │   │  ActiveParking  │   │  CacheSnapshot  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (PinId)     │   │  location       │   │  parkingLocation│       │
//! │  │  lat / lng      │   │  photo          │   │  parkingPhoto   │       │
//! │  │  label          │   │  pinned_at      │   │  savedLocations │       │
//! │  │  category       │   └─────────────────┘   │  timestamp      │       │
//! │  │  photo          │                         └─────────────────┘       │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     PinId       │   │    Category     │   │  ParkingStatus  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  "local-<uuid>" │   │  Parking        │   │  None           │       │
//! │  │  or remote id   │   │  Custom         │   │  ActiveNoPhoto  │       │
//! │  └─────────────────┘   └─────────────────┘   │  ActiveWithPhoto│       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Local-First Identity Pattern
//! Records minted offline get a `local-<uuid>` id so the UI can address them
//! immediately. A later sync push creates the remote record and rewrites the
//! id to the backend-assigned one; the `local-` prefix is what the dedup
//! logic keys on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::geo::Coordinates;
use crate::LOCAL_ID_PREFIX;

// =============================================================================
// Pin Id
// =============================================================================

/// Identifier of a pin record.
///
/// ## Two Origins
/// - `PinId::local()` mints a `local-<uuid>` id for records created on this
///   device that have not been pushed yet
/// - `PinId::remote()` wraps a backend-assigned id learned from a pull or a
///   successful create
///
/// The distinction drives the sync dedup rule: only local ids are eligible
/// for a remote create, so a record is never created twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct PinId(String);

impl PinId {
    /// Mints a fresh local id for a record created on this device.
    pub fn local() -> Self {
        PinId(format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4()))
    }

    /// Wraps a backend-assigned id.
    pub fn remote(id: impl Into<String>) -> Self {
        PinId(id.into())
    }

    /// True for ids minted locally and not yet replaced by a push.
    #[inline]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    /// The raw id string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Category
// =============================================================================

/// What kind of place a pin marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The car record. At most one is active per user.
    Parking,
    /// A user-saved place (home, work, a favorite garage).
    Custom,
}

impl Default for Category {
    fn default() -> Self {
        Category::Custom
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Parking => f.write_str("parking"),
            Category::Custom => f.write_str("custom"),
        }
    }
}

// =============================================================================
// Photo Reference
// =============================================================================

/// Reference to a parking photo.
///
/// ## Two-Phase Lifecycle
/// ```text
/// Camera capture ──► Inline (data URL)  - renderable immediately, cached
///                        │
///                        │  upload resolves (online only)
///                        ▼
///                    Url (https://...)  - durable, replaces the inline ref
/// ```
///
/// On the wire and in the cache a photo is just a string; the variant is
/// recovered from the `data:` scheme prefix when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhotoRef {
    /// Inline-encoded image (a `data:` URL), available before any upload.
    Inline(String),
    /// Durable URL assigned by photo storage after an upload.
    Url(String),
}

impl PhotoRef {
    /// Classifies a raw photo string by its scheme.
    pub fn from_wire(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.starts_with("data:") {
            PhotoRef::Inline(value)
        } else {
            PhotoRef::Url(value)
        }
    }

    /// The raw string, whichever variant.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            PhotoRef::Inline(s) | PhotoRef::Url(s) => s,
        }
    }

    /// True once the photo has a durable storage URL.
    #[inline]
    pub fn is_durable(&self) -> bool {
        matches!(self, PhotoRef::Url(_))
    }
}

impl From<String> for PhotoRef {
    fn from(value: String) -> Self {
        PhotoRef::from_wire(value)
    }
}

impl From<PhotoRef> for String {
    fn from(value: PhotoRef) -> Self {
        match value {
            PhotoRef::Inline(s) | PhotoRef::Url(s) => s,
        }
    }
}

// =============================================================================
// Location Pin
// =============================================================================

/// A saved place record, as cached locally and mirrored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LocationPin {
    /// Record identifier; `local-` prefixed until synced.
    pub id: PinId,

    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// Display name shown in the saved-places list.
    pub label: String,

    /// Parking record or user-saved place.
    pub category: Category,

    /// Whether a parking record is the current pin. Always false for
    /// custom places.
    #[serde(default)]
    pub is_active: bool,

    /// Optional photo attached to this place.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub photo: Option<PhotoRef>,

    /// When the record was created on its origin device.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the record was last confirmed by the backend.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl LocationPin {
    /// Creates a new user-saved place at the given position, with a fresh
    /// local id.
    pub fn custom(label: impl Into<String>, position: Coordinates) -> Self {
        LocationPin {
            id: PinId::local(),
            latitude: position.lat,
            longitude: position.lng,
            label: label.into(),
            category: Category::Custom,
            is_active: false,
            photo: None,
            created_at: Utc::now(),
            synced_at: None,
        }
    }

    /// The pin's position as coordinates.
    #[inline]
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// True once the record carries a backend-assigned id.
    #[inline]
    pub fn is_synced(&self) -> bool {
        !self.id.is_local()
    }
}

// =============================================================================
// Active Parking
// =============================================================================

/// The single active parking pin, tracked separately from saved places.
///
/// There is at most one of these per user. Pinning while one exists archives
/// the previous pin into the history log first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ActiveParking {
    /// Where the car is.
    pub location: Coordinates,

    /// Optional photo of the spot.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub photo: Option<PhotoRef>,

    /// When the car was pinned.
    #[ts(as = "String")]
    pub pinned_at: DateTime<Utc>,
}

impl ActiveParking {
    /// Pins the car at a position, with no photo yet.
    pub fn at(location: Coordinates) -> Self {
        ActiveParking {
            location,
            photo: None,
            pinned_at: Utc::now(),
        }
    }

    /// The status this pin represents.
    #[inline]
    pub fn status(&self) -> ParkingStatus {
        if self.photo.is_some() {
            ParkingStatus::ActiveWithPhoto
        } else {
            ParkingStatus::ActiveNoPhoto
        }
    }
}

// =============================================================================
// Parking Status
// =============================================================================

/// The three observable parking states the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ParkingStatus {
    /// No car pinned.
    None,
    /// Car pinned, no photo of the spot.
    ActiveNoPhoto,
    /// Car pinned with a photo.
    ActiveWithPhoto,
}

impl ParkingStatus {
    /// True when a car is pinned, with or without a photo.
    #[inline]
    pub fn is_active(&self) -> bool {
        !matches!(self, ParkingStatus::None)
    }
}

impl std::fmt::Display for ParkingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParkingStatus::None => f.write_str("none"),
            ParkingStatus::ActiveNoPhoto => f.write_str("active_no_photo"),
            ParkingStatus::ActiveWithPhoto => f.write_str("active_with_photo"),
        }
    }
}

// =============================================================================
// Saved Locations
// =============================================================================

/// The user's saved places, insertion-ordered for display.
///
/// Holds only `Category::Custom` pins; the parking record lives in
/// [`ActiveParking`]. Pulls rebuild this set wholesale from the remote
/// collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct SavedLocations(Vec<LocationPin>);

impl SavedLocations {
    /// Creates an empty set.
    pub fn new() -> Self {
        SavedLocations(Vec::new())
    }

    /// Wraps an existing list of pins.
    pub fn from_pins(pins: Vec<LocationPin>) -> Self {
        SavedLocations(pins)
    }

    /// Appends a pin.
    pub fn add(&mut self, pin: LocationPin) {
        self.0.push(pin);
    }

    /// Removes a pin by id, returning it when present.
    pub fn remove(&mut self, id: &PinId) -> Option<LocationPin> {
        let index = self.0.iter().position(|pin| &pin.id == id)?;
        Some(self.0.remove(index))
    }

    /// Looks up a pin by id.
    pub fn get(&self, id: &PinId) -> Option<&LocationPin> {
        self.0.iter().find(|pin| &pin.id == id)
    }

    /// Rewrites a local id with the backend-assigned one after a successful
    /// create. Returns false when the local id is no longer present.
    pub fn mark_synced(&mut self, local: &PinId, remote: PinId, at: DateTime<Utc>) -> bool {
        match self.0.iter_mut().find(|pin| &pin.id == local) {
            Some(pin) => {
                pin.id = remote;
                pin.synced_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Pins that still carry a local id and need a remote create.
    pub fn unsynced(&self) -> impl Iterator<Item = &LocationPin> {
        self.0.iter().filter(|pin| pin.id.is_local())
    }

    /// Number of pins awaiting their first push.
    pub fn unsynced_count(&self) -> usize {
        self.unsynced().count()
    }

    /// Iterates the pins in display order.
    pub fn iter(&self) -> impl Iterator<Item = &LocationPin> {
        self.0.iter()
    }

    /// The pins as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[LocationPin] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Cache Snapshot
// =============================================================================

/// The full serializable projection of parking state, written to the local
/// cache after every mutation and read back on startup.
///
/// ## Shape
/// ```text
/// {
///   "parkingLocation": { "lat": 37.77, "lng": -122.41 } | null,
///   "parkingPhoto":    "data:image/jpeg;base64,..." | "https://..." | null,
///   "savedLocations":  [ { "id": ..., "latitude": ..., ... } ],
///   "timestamp":       "2026-08-25T18:03:11Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    /// Position of the active pin, if any.
    pub parking_location: Option<Coordinates>,

    /// Photo of the active pin, if any.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub parking_photo: Option<PhotoRef>,

    /// Saved places in display order.
    #[serde(default)]
    pub saved_locations: SavedLocations,

    /// When the snapshot was written.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl CacheSnapshot {
    /// A snapshot of the empty state.
    pub fn empty() -> Self {
        CacheSnapshot {
            parking_location: None,
            parking_photo: None,
            saved_locations: SavedLocations::new(),
            timestamp: Utc::now(),
        }
    }

    /// The parking status this snapshot encodes.
    pub fn parking_status(&self) -> ParkingStatus {
        match (&self.parking_location, &self.parking_photo) {
            (None, _) => ParkingStatus::None,
            (Some(_), None) => ParkingStatus::ActiveNoPhoto,
            (Some(_), Some(_)) => ParkingStatus::ActiveWithPhoto,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
