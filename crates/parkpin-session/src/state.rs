//! # In-Memory Parking State
//!
//! The single state tree behind the session facade. All transitions are
//! pure: no I/O, no clocks beyond timestamping, so every rule is testable
//! without a cache or a network.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Parking State Transitions                          │
//! │                                                                         │
//! │                  pin(position)                                          │
//! │   ┌────────┐  ───────────────────►  ┌─────────────────┐                │
//! │   │  none  │                        │ active-no-photo │                │
//! │   └────────┘  ◄───────────────────  └────────┬────────┘                │
//! │        ▲            clear()                  │ attach_photo            │
//! │        │                                     ▼                         │
//! │        │       clear()             ┌───────────────────┐               │
//! │        └─────────────────────────  │ active-with-photo │               │
//! │                                    └───────────────────┘               │
//! │                                                                         │
//! │   pin() while active   → previous pin archived to history first        │
//! │   clear() while active → pin archived to history                       │
//! │   restore(entry)       → re-enters active-*; history untouched         │
//! │                                                                         │
//! │   Saved places (add/remove) are independent of this machine.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use parkpin_core::{
    distance_miles, ActiveParking, CacheSnapshot, CoreError, CoreResult, Coordinates,
    HistoryEntry, LocationPin, ParkingHistory, ParkingStatus, PhotoRef, PinId, SavedLocations,
};

// =============================================================================
// Parking State
// =============================================================================

/// Everything the session knows, in one place.
#[derive(Debug, Clone, Default)]
pub struct ParkingState {
    /// The active parking pin, if the car is pinned.
    pub active: Option<ActiveParking>,

    /// The user's saved places.
    pub saved: SavedLocations,

    /// The bounded archive of previous parking spots. Local-only.
    pub history: ParkingHistory,

    /// Most recent position sample from the geolocation provider.
    /// Not persisted; commands that need a position no-op until it arrives.
    pub last_position: Option<Coordinates>,
}

impl ParkingState {
    /// A fresh, empty state (first run).
    pub fn new() -> Self {
        ParkingState::default()
    }

    /// Rebuilds state from what the cache held at last shutdown.
    ///
    /// The cached snapshot has no separate pin time, so a restored pin
    /// borrows the snapshot's write time.
    pub fn from_cache(snapshot: Option<CacheSnapshot>, history: ParkingHistory) -> Self {
        let (active, saved) = match snapshot {
            Some(snap) => {
                let active = snap.parking_location.map(|location| ActiveParking {
                    location,
                    photo: snap.parking_photo,
                    pinned_at: snap.timestamp,
                });
                (active, snap.saved_locations)
            }
            None => (None, SavedLocations::new()),
        };

        ParkingState {
            active,
            saved,
            history,
            last_position: None,
        }
    }

    /// The serializable projection written to the cache.
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            parking_location: self.active.as_ref().map(|a| a.location),
            parking_photo: self.active.as_ref().and_then(|a| a.photo.clone()),
            saved_locations: self.saved.clone(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// The observable parking status.
    pub fn status(&self) -> ParkingStatus {
        match &self.active {
            Some(active) => active.status(),
            None => ParkingStatus::None,
        }
    }

    // =========================================================================
    // Parking Transitions
    // =========================================================================

    /// Pins the car at a position, archiving any previous pin first.
    ///
    /// Returns true when a previous pin went into the history log (the
    /// caller then persists the log too).
    pub fn pin(&mut self, position: Coordinates) -> bool {
        let archived = self.archive_active();
        self.active = Some(ActiveParking::at(position));
        archived
    }

    /// Attaches or replaces the photo on the active pin.
    ///
    /// Returns the pin's position so the caller can schedule the matching
    /// parking push without re-reading state.
    pub fn attach_photo(&mut self, photo: PhotoRef) -> CoreResult<Coordinates> {
        match &mut self.active {
            Some(active) => {
                active.photo = Some(photo);
                Ok(active.location)
            }
            None => Err(CoreError::NoActiveParking),
        }
    }

    /// Clears the pin, archiving it. Returns false when nothing was pinned.
    pub fn clear(&mut self) -> bool {
        let archived = self.archive_active();
        self.active = None;
        archived
    }

    /// Re-enters the active state from a history entry.
    ///
    /// The entry stays in the log, and nothing else in the log moves.
    pub fn restore(&mut self, entry_id: &str) -> CoreResult<ActiveParking> {
        let entry = self
            .history
            .get(entry_id)
            .ok_or_else(|| CoreError::HistoryEntryNotFound(entry_id.to_string()))?;

        let restored = ActiveParking {
            location: entry.location,
            photo: entry.photo.clone(),
            pinned_at: chrono::Utc::now(),
        };
        self.active = Some(restored.clone());
        Ok(restored)
    }

    /// Moves the active pin (if any) into the history log.
    fn archive_active(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                self.history
                    .push(HistoryEntry::archive(active.location, active.photo));
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Saved Places
    // =========================================================================

    /// Adds a saved place.
    pub fn add_saved(&mut self, pin: LocationPin) {
        self.saved.add(pin);
    }

    /// Removes a saved place, returning it when present.
    pub fn remove_saved(&mut self, id: &PinId) -> Option<LocationPin> {
        self.saved.remove(id)
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    /// Miles between the latest position sample and the pinned car.
    ///
    /// None until both a fix and a pin exist.
    pub fn distance_to_parking(&self) -> Option<f64> {
        let position = self.last_position?;
        let active = self.active.as_ref()?;
        Some(distance_miles(position, active.location))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parkpin_core::HISTORY_CAPACITY;

    fn pos(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng)
    }

    #[test]
    fn test_fresh_state_is_empty() {
        let state = ParkingState::new();
        assert_eq!(state.status(), ParkingStatus::None);
        assert!(state.saved.is_empty());
        assert!(state.history.is_empty());
        assert!(state.distance_to_parking().is_none());
    }

    #[test]
    fn test_pin_enters_active_no_photo() {
        let mut state = ParkingState::new();
        let archived = state.pin(pos(37.77, -122.41));

        assert!(!archived);
        assert_eq!(state.status(), ParkingStatus::ActiveNoPhoto);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_repin_archives_previous_spot() {
        let mut state = ParkingState::new();
        state.pin(pos(37.0, -122.0));
        let archived = state.pin(pos(38.0, -121.0));

        assert!(archived);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.entries()[0].location, pos(37.0, -122.0));
        // The new pin is the active one
        let active = state.active.as_ref().unwrap();
        assert_eq!(active.location, pos(38.0, -121.0));
    }

    #[test]
    fn test_attach_photo_upgrades_status() {
        let mut state = ParkingState::new();
        state.pin(pos(37.0, -122.0));

        let position = state
            .attach_photo(PhotoRef::Inline("data:image/jpeg;base64,AA".into()))
            .unwrap();

        assert_eq!(position, pos(37.0, -122.0));
        assert_eq!(state.status(), ParkingStatus::ActiveWithPhoto);
    }

    #[test]
    fn test_attach_photo_without_pin_is_rejected() {
        let mut state = ParkingState::new();
        let err = state
            .attach_photo(PhotoRef::Inline("data:image/jpeg;base64,AA".into()))
            .unwrap_err();
        assert!(matches!(err, CoreError::NoActiveParking));
    }

    #[test]
    fn test_pin_pin_clear_archives_in_order() {
        let mut state = ParkingState::new();
        state.pin(pos(1.0, 1.0)); // A
        state.pin(pos(2.0, 2.0)); // B (archives A)
        let archived = state.clear(); // archives B

        assert!(archived);
        assert_eq!(state.status(), ParkingStatus::None);
        assert_eq!(state.history.len(), 2);
        // Newest first: B then A
        assert_eq!(state.history.entries()[0].location, pos(2.0, 2.0));
        assert_eq!(state.history.entries()[1].location, pos(1.0, 1.0));
    }

    #[test]
    fn test_clear_without_pin_is_a_no_op() {
        let mut state = ParkingState::new();
        assert!(!state.clear());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_history_stays_bounded_across_many_repins() {
        let mut state = ParkingState::new();
        for i in 0..10 {
            state.pin(pos(i as f64, i as f64));
        }
        state.clear();

        assert_eq!(state.history.len(), HISTORY_CAPACITY);
        // Most recent archive on top
        assert_eq!(state.history.entries()[0].location, pos(9.0, 9.0));
    }

    #[test]
    fn test_restore_reenters_active_and_keeps_history() {
        let mut state = ParkingState::new();
        state.pin(pos(1.0, 1.0));
        state
            .attach_photo(PhotoRef::Url("https://photos.invalid/a.jpg".into()))
            .unwrap();
        state.clear();
        let entry_id = state.history.entries()[0].id.clone();

        let restored = state.restore(&entry_id).unwrap();

        assert_eq!(restored.location, pos(1.0, 1.0));
        assert_eq!(state.status(), ParkingStatus::ActiveWithPhoto);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_restore_without_photo_is_active_no_photo() {
        let mut state = ParkingState::new();
        state.pin(pos(1.0, 1.0));
        state.clear();
        let entry_id = state.history.entries()[0].id.clone();

        state.restore(&entry_id).unwrap();
        assert_eq!(state.status(), ParkingStatus::ActiveNoPhoto);
    }

    #[test]
    fn test_restore_unknown_entry_fails() {
        let mut state = ParkingState::new();
        let err = state.restore("not-a-real-id").unwrap_err();
        assert!(matches!(err, CoreError::HistoryEntryNotFound(_)));
    }

    #[test]
    fn test_snapshot_round_trips_through_cache_shape() {
        let mut state = ParkingState::new();
        state.pin(pos(37.77, -122.41));
        state
            .attach_photo(PhotoRef::Url("https://photos.invalid/a.jpg".into()))
            .unwrap();
        state.add_saved(LocationPin::custom("Home", pos(37.75, -122.45)));

        let restored = ParkingState::from_cache(Some(state.snapshot()), state.history.clone());

        assert_eq!(restored.status(), ParkingStatus::ActiveWithPhoto);
        assert_eq!(restored.saved.len(), 1);
        assert_eq!(
            restored.active.as_ref().unwrap().location,
            pos(37.77, -122.41)
        );
    }

    #[test]
    fn test_from_cache_with_no_snapshot_is_first_run() {
        let state = ParkingState::from_cache(None, ParkingHistory::new());
        assert_eq!(state.status(), ParkingStatus::None);
        assert!(state.saved.is_empty());
    }

    #[test]
    fn test_distance_needs_fix_and_pin() {
        let mut state = ParkingState::new();
        state.last_position = Some(pos(0.0, 0.0));
        assert!(state.distance_to_parking().is_none());

        state.pin(pos(0.0, 1.0));
        // One degree of longitude at the equator
        assert_eq!(state.distance_to_parking(), Some(69.1));
    }

    #[test]
    fn test_remove_saved_returns_the_pin() {
        let mut state = ParkingState::new();
        let pin = LocationPin::custom("Work", pos(37.79, -122.40));
        let id = pin.id.clone();
        state.add_saved(pin);

        let removed = state.remove_saved(&id);
        assert!(removed.is_some());
        assert!(state.saved.is_empty());
        assert!(state.remove_saved(&id).is_none());
    }
}
