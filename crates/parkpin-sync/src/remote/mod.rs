//! # Remote Store Abstraction
//!
//! The narrow capability interface the sync engine reconciles against.
//!
//! ## Why a Trait
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Remote Store Boundary                               │
//! │                                                                         │
//! │            SyncEngine                                                   │
//! │                │                                                        │
//! │                │  list / create / update / delete                       │
//! │                ▼                                                        │
//! │        dyn RemoteStore                                                  │
//! │         ┌──────┴───────┐                                                │
//! │         ▼              ▼                                                │
//! │  RestRemoteStore  MemoryRemoteStore                                     │
//! │  (production)     (tests, offline demos)                                │
//! │                                                                         │
//! │  The engine and the session never see HTTP. Everything above this      │
//! │  line works against one record type and four operations.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! One collection of records per user. Each record:
//! ```json
//! {
//!   "id": "rec-7xk2",
//!   "latitude": 37.7793,
//!   "longitude": -122.4192,
//!   "label": "My Car",
//!   "category": "parking",
//!   "isActive": true,
//!   "photoUrl": "https://photos.parkpin.example/abc.jpg",
//!   "timestamp": "2026-08-25T18:03:11Z",
//!   "syncedAt": "2026-08-25T18:03:12Z"
//! }
//! ```

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parkpin_core::{Category, Coordinates, LocationPin, PhotoRef, PinId, PARKING_LABEL};

use crate::error::SyncResult;

// =============================================================================
// Remote Record
// =============================================================================

/// A location record as stored remotely, id included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    /// Backend-assigned record id.
    pub id: String,

    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// Display label.
    pub label: String,

    /// Parking record or user-saved place.
    pub category: Category,

    /// Whether this is the current parking pin. Meaningful only for
    /// `category = parking`; absent on custom records.
    #[serde(default)]
    pub is_active: bool,

    /// Durable photo URL, if one was uploaded.
    #[serde(default)]
    pub photo_url: Option<String>,

    /// When the record was created on its origin device.
    pub timestamp: DateTime<Utc>,

    /// When the record was last confirmed by a push.
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
}

impl RemoteRecord {
    /// True for the record that is the user's current parking pin.
    #[inline]
    pub fn is_active_parking(&self) -> bool {
        self.category == Category::Parking && self.is_active
    }

    /// The record's position as coordinates.
    #[inline]
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Converts a pulled record into a local pin carrying the remote id.
    pub fn into_pin(self) -> LocationPin {
        LocationPin {
            id: PinId::remote(self.id),
            latitude: self.latitude,
            longitude: self.longitude,
            label: self.label,
            category: self.category,
            is_active: self.is_active,
            photo: self.photo_url.map(PhotoRef::from_wire),
            created_at: self.timestamp,
            synced_at: self.synced_at,
        }
    }
}

// =============================================================================
// Record Draft
// =============================================================================

/// A record to create remotely. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub category: Category,
    pub is_active: bool,
    pub photo_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RecordDraft {
    /// Draft for the user's parking record.
    ///
    /// There is never a second one of these: the engine only creates a
    /// parking draft after confirming no parking record exists remotely.
    pub fn parking(position: Coordinates, photo_url: Option<String>) -> Self {
        RecordDraft {
            latitude: position.lat,
            longitude: position.lng,
            label: PARKING_LABEL.to_string(),
            category: Category::Parking,
            is_active: true,
            photo_url,
            timestamp: Utc::now(),
        }
    }

    /// Draft for a user-saved place, taken from the local pin.
    pub fn custom(pin: &LocationPin) -> Self {
        RecordDraft {
            latitude: pin.latitude,
            longitude: pin.longitude,
            label: pin.label.clone(),
            category: Category::Custom,
            is_active: false,
            photo_url: pin.photo.as_ref().map(|p| p.as_str().to_string()),
            timestamp: pin.created_at,
        }
    }
}

// =============================================================================
// Record Patch
// =============================================================================

/// A partial update to an existing remote record.
///
/// Only set fields go on the wire. `photo_url` is double-optional because
/// an explicit `"photoUrl": null` clears the photo, which is different
/// from not mentioning it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl RecordPatch {
    /// Patch that moves the parking record to a new position and photo,
    /// reactivating it if a previous clear deactivated it.
    pub fn parking_update(position: Coordinates, photo_url: Option<String>) -> Self {
        RecordPatch {
            latitude: Some(position.lat),
            longitude: Some(position.lng),
            is_active: Some(true),
            photo_url: Some(photo_url),
            synced_at: Some(Utc::now()),
        }
    }

    /// Patch that retires the parking record without deleting it.
    ///
    /// The record is kept so the next pin can reuse it, which is what makes
    /// a second active parking record structurally impossible.
    pub fn deactivation() -> Self {
        RecordPatch {
            latitude: None,
            longitude: None,
            is_active: Some(false),
            photo_url: None,
            synced_at: Some(Utc::now()),
        }
    }
}

// =============================================================================
// Remote Store Trait
// =============================================================================

/// Capability interface over the per-user remote location collection.
///
/// Four operations over one record type. Implementations must be safe to
/// call from concurrent tasks.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches all of the user's records.
    async fn list(&self, user_id: &str) -> SyncResult<Vec<RemoteRecord>>;

    /// Creates a record, returning it with its backend-assigned id.
    async fn create(&self, user_id: &str, draft: &RecordDraft) -> SyncResult<RemoteRecord>;

    /// Applies a partial update to an existing record.
    async fn update(&self, user_id: &str, record_id: &str, patch: &RecordPatch) -> SyncResult<()>;

    /// Deletes a record. Deleting an already-gone record is not an error.
    async fn delete(&self, user_id: &str, record_id: &str) -> SyncResult<()>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RemoteRecord {
        RemoteRecord {
            id: "rec-0001".to_string(),
            latitude: 37.7793,
            longitude: -122.4192,
            label: PARKING_LABEL.to_string(),
            category: Category::Parking,
            is_active: true,
            photo_url: Some("https://photos.parkpin.example/abc.jpg".to_string()),
            timestamp: Utc::now(),
            synced_at: None,
        }
    }

    #[test]
    fn test_record_wire_shape() {
        let json = serde_json::to_string(&sample_record()).unwrap();
        assert!(json.contains("\"isActive\":true"));
        assert!(json.contains("\"photoUrl\""));
        assert!(json.contains("\"category\":\"parking\""));
    }

    #[test]
    fn test_custom_record_without_active_flag_parses() {
        // Custom records omit isActive on the wire
        let json = r#"{
            "id": "rec-0002",
            "latitude": 37.75,
            "longitude": -122.45,
            "label": "Home",
            "category": "custom",
            "timestamp": "2026-08-25T18:03:11Z"
        }"#;
        let record: RemoteRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_active);
        assert!(!record.is_active_parking());
        assert!(record.photo_url.is_none());
    }

    #[test]
    fn test_into_pin_carries_remote_id() {
        let pin = sample_record().into_pin();
        assert!(!pin.id.is_local());
        assert_eq!(pin.id.as_str(), "rec-0001");
        assert!(matches!(pin.photo, Some(PhotoRef::Url(_))));
    }

    #[test]
    fn test_parking_draft_shape() {
        let draft = RecordDraft::parking(Coordinates::new(37.0, -122.0), None);
        assert_eq!(draft.label, PARKING_LABEL);
        assert_eq!(draft.category, Category::Parking);
        assert!(draft.is_active);
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = RecordPatch::deactivation();
        let json = serde_json::to_string(&patch).unwrap();
        assert!(json.contains("\"isActive\":false"));
        assert!(!json.contains("latitude"));
        assert!(!json.contains("photoUrl"));
    }

    #[test]
    fn test_patch_explicit_null_clears_photo() {
        let patch = RecordPatch::parking_update(Coordinates::new(37.0, -122.0), None);
        let json = serde_json::to_string(&patch).unwrap();
        assert!(json.contains("\"photoUrl\":null"));
        assert!(json.contains("\"isActive\":true"));
    }
}
