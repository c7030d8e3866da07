//! # Parking History
//!
//! The bounded, newest-first log of previous parking spots.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      How Entries Get Here                               │
//! │                                                                         │
//! │  pin_car (while already pinned) ──► archive old pin ──► push_front     │
//! │  clear_parking                  ──► archive pin      ──► push_front    │
//! │                                                                         │
//! │  The log never grows past HISTORY_CAPACITY: the oldest entry falls     │
//! │  off the back on every insert beyond the bound.                        │
//! │                                                                         │
//! │  restore_from_history copies an entry back into the active pin but    │
//! │  does NOT remove it from the log.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The history is device-local. It is cached alongside the snapshot but never
//! pushed to the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::geo::Coordinates;
use crate::types::PhotoRef;
use crate::HISTORY_CAPACITY;

// =============================================================================
// History Entry
// =============================================================================

/// One archived parking spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Entry identifier, unique within this device's log.
    pub id: String,

    /// Where the car was.
    pub location: Coordinates,

    /// Photo of the spot, if one was attached while active.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub photo: Option<PhotoRef>,

    /// When the spot was archived (pinned over or cleared).
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Archives a parking spot right now.
    pub fn archive(location: Coordinates, photo: Option<PhotoRef>) -> Self {
        HistoryEntry {
            id: Uuid::new_v4().to_string(),
            location,
            photo,
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Parking History
// =============================================================================

/// The bounded log, newest first.
///
/// Index 0 is always the most recently archived spot. Inserts beyond
/// [`HISTORY_CAPACITY`] silently drop the oldest entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct ParkingHistory(Vec<HistoryEntry>);

impl ParkingHistory {
    /// An empty log.
    pub fn new() -> Self {
        ParkingHistory(Vec::new())
    }

    /// Wraps entries loaded from the cache, enforcing the bound in case a
    /// cached log predates a capacity change.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        ParkingHistory(entries)
    }

    /// Prepends an entry, trimming the log back to capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.0.insert(0, entry);
        self.0.truncate(HISTORY_CAPACITY);
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.0.iter().find(|entry| entry.id == id)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entries, newest first.
    #[inline]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    /// Iterates entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.0.iter()
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
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(lat: f64) -> HistoryEntry {
        HistoryEntry::archive(Coordinates::new(lat, -122.0), None)
    }

    #[test]
    fn test_newest_entry_is_first() {
        let mut history = ParkingHistory::new();
        let first = entry_at(37.1);
        let second = entry_at(37.2);
        history.push(first.clone());
        history.push(second.clone());

        assert_eq!(history.entries()[0].id, second.id);
        assert_eq!(history.entries()[1].id, first.id);
    }

    #[test]
    fn test_log_never_exceeds_capacity() {
        let mut history = ParkingHistory::new();
        for i in 0..HISTORY_CAPACITY + 3 {
            history.push(entry_at(37.0 + i as f64 / 10.0));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_overflow_drops_the_oldest() {
        let mut history = ParkingHistory::new();
        let oldest = entry_at(37.0);
        history.push(oldest.clone());
        for i in 1..=HISTORY_CAPACITY {
            history.push(entry_at(37.0 + i as f64 / 10.0));
        }
        assert!(history.get(&oldest.id).is_none());
        assert_eq!(history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_get_finds_entry_by_id() {
        let mut history = ParkingHistory::new();
        let entry = entry_at(37.5);
        let id = entry.id.clone();
        history.push(entry);
        history.push(entry_at(37.6));

        let found = history.get(&id).unwrap();
        assert_eq!(found.location.lat, 37.5);
        assert!(history.get("no-such-id").is_none());
    }

    #[test]
    fn test_from_entries_enforces_bound() {
        let entries: Vec<_> = (0..HISTORY_CAPACITY + 2)
            .map(|i| entry_at(37.0 + i as f64 / 10.0))
            .collect();
        let history = ParkingHistory::from_entries(entries);
        assert_eq!(history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_clear_empties_the_log() {
        let mut history = ParkingHistory::new();
        history.push(entry_at(37.1));
        history.push(entry_at(37.2));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut history = ParkingHistory::new();
        history.push(entry_at(37.1));
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.starts_with('['));

        let back: ParkingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
