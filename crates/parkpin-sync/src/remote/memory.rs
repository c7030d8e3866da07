//! # In-Memory Remote Store
//!
//! [`RemoteStore`] double backed by a map. Used by engine and session tests
//! to assert exact remote traffic (how many creates, which updates) without
//! a server, and by offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{SyncError, SyncResult};
use crate::remote::{RecordDraft, RecordPatch, RemoteRecord, RemoteStore};

/// In-memory remote store with operation counters.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    /// Records per user id.
    records: Mutex<HashMap<String, Vec<RemoteRecord>>>,

    /// Monotonic id source for created records.
    next_id: AtomicU64,

    /// When set, every operation fails as if the network dropped.
    fail: AtomicBool,

    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryRemoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with a connection error.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Seeds a record directly, bypassing `create`.
    pub fn insert_record(&self, user_id: &str, record: RemoteRecord) {
        let mut records = self.records.lock().expect("Record store mutex poisoned");
        records.entry(user_id.to_string()).or_default().push(record);
    }

    /// Snapshot of a user's records, for assertions.
    pub fn records_for(&self, user_id: &str) -> Vec<RemoteRecord> {
        let records = self.records.lock().expect("Record store mutex poisoned");
        records.get(user_id).cloned().unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> SyncResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(SyncError::ConnectionFailed("simulated outage".into()))
        } else {
            Ok(())
        }
    }

    fn mint_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("rec-{:04}", n)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn list(&self, user_id: &str) -> SyncResult<Vec<RemoteRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.records_for(user_id))
    }

    async fn create(&self, user_id: &str, draft: &RecordDraft) -> SyncResult<RemoteRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let record = RemoteRecord {
            id: self.mint_id(),
            latitude: draft.latitude,
            longitude: draft.longitude,
            label: draft.label.clone(),
            category: draft.category,
            is_active: draft.is_active,
            photo_url: draft.photo_url.clone(),
            timestamp: draft.timestamp,
            synced_at: Some(Utc::now()),
        };

        let mut records = self.records.lock().expect("Record store mutex poisoned");
        records
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn update(&self, user_id: &str, record_id: &str, patch: &RecordPatch) -> SyncResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let mut records = self.records.lock().expect("Record store mutex poisoned");
        let record = records
            .get_mut(user_id)
            .and_then(|list| list.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| SyncError::RecordNotFound(record_id.to_string()))?;

        if let Some(latitude) = patch.latitude {
            record.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            record.longitude = longitude;
        }
        if let Some(is_active) = patch.is_active {
            record.is_active = is_active;
        }
        if let Some(ref photo_url) = patch.photo_url {
            record.photo_url = photo_url.clone();
        }
        if let Some(synced_at) = patch.synced_at {
            record.synced_at = Some(synced_at);
        }

        Ok(())
    }

    async fn delete(&self, user_id: &str, record_id: &str) -> SyncResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;

        let mut records = self.records.lock().expect("Record store mutex poisoned");
        if let Some(list) = records.get_mut(user_id) {
            // Deleting an already-gone record is not an error
            list.retain(|r| r.id != record_id);
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
