//! Test doubles and common utilities for reconciliation contract tests
//!
//! `MockDirectory` is an in-memory directory service holding one record
//! set per view. Writes mutate the store, so a second pass (or a second
//! run) observes the first one's effects exactly like the real service
//! would.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use viewsync_core::error::{Error, Result};
use viewsync_core::record::ARecord;
use viewsync_core::traits::DirectoryClient;

/// In-memory directory service covering any number of views of one zone
#[derive(Default)]
pub struct MockDirectory {
    /// Records per view name
    store: Mutex<HashMap<String, Vec<ARecord>>>,

    /// Views whose list calls fail (simulated outage)
    unreachable_views: Mutex<HashSet<String>>,

    /// Keys whose create calls fail (simulated per-record transport error)
    failing_create_keys: Mutex<HashSet<String>>,

    /// Number of upcoming list calls to fail, regardless of view
    failing_lists: AtomicUsize,

    /// Monotonic id source for created records
    next_id: AtomicUsize,

    /// Call counters
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a view with records
    pub fn seed(&self, view: &str, records: Vec<ARecord>) {
        self.store.lock().unwrap().insert(view.to_string(), records);
    }

    /// Make list calls for a view fail
    pub fn set_unreachable(&self, view: &str) {
        self.unreachable_views
            .lock()
            .unwrap()
            .insert(view.to_string());
    }

    /// Make the next `n` list calls fail, whatever view they address
    pub fn fail_next_lists(&self, n: usize) {
        self.failing_lists.store(n, Ordering::SeqCst);
    }

    /// Make create calls for a key fail
    pub fn fail_creates_for(&self, key: &str) {
        self.failing_create_keys
            .lock()
            .unwrap()
            .insert(key.to_string());
    }

    /// Snapshot of a view's records
    pub fn records_in(&self, view: &str) -> Vec<ARecord> {
        self.store
            .lock()
            .unwrap()
            .get(view)
            .cloned()
            .unwrap_or_default()
    }

    /// Find a record by key in a view
    pub fn find(&self, view: &str, relative_name: &str) -> Option<ARecord> {
        self.records_in(view)
            .into_iter()
            .find(|r| r.relative_name == relative_name)
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

    pub fn mutation_calls(&self) -> usize {
        self.create_calls() + self.update_calls()
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn list_a_records(&self, _zone: &str, view: &str) -> Result<Vec<ARecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.unreachable_views.lock().unwrap().contains(view) {
            return Err(Error::http(format!("connection refused listing {view}")));
        }

        if self
            .failing_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::http(format!("transient failure listing {view}")));
        }

        Ok(self.records_in(view))
    }

    async fn create_record(
        &self,
        view: &str,
        relative_name: &str,
        address: &str,
        _zone: &str,
        annotation: &str,
    ) -> Result<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .failing_create_keys
            .lock()
            .unwrap()
            .contains(relative_name)
        {
            return Err(Error::directory(view, "simulated create failure"));
        }

        let id = format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = ARecord::new(relative_name, address, view, id.clone())
            .with_annotation(annotation);
        self.store
            .lock()
            .unwrap()
            .entry(view.to_string())
            .or_default()
            .push(record);
        Ok(id)
    }

    async fn update_record(&self, record_id: &str, address: &str, annotation: &str) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut store = self.store.lock().unwrap();
        for records in store.values_mut() {
            if let Some(record) = records.iter_mut().find(|r| r.record_id == record_id) {
                record.address = address.to_string();
                record.annotation = Some(annotation.to_string());
                return Ok(());
            }
        }
        Err(Error::not_found(format!("record id {record_id}")))
    }
}

/// Helper to build a record with a provenance marker from `origin_view`
pub fn marked_record(
    relative_name: &str,
    address: &str,
    view: &str,
    record_id: &str,
    origin_view: &str,
) -> ARecord {
    let marker = viewsync_core::marker::encode(origin_view, chrono::Utc::now(), None);
    ARecord::new(relative_name, address, view, record_id).with_annotation(marker)
}

/// Helper to create a minimal SyncConfig for testing
pub fn test_config() -> viewsync_core::config::SyncConfig {
    viewsync_core::config::SyncConfig::new("example.com.", "VIEW-A", "VIEW-B")
}
