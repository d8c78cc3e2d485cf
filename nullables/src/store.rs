//! Nullable batch store that records every snapshot in memory.

use fanout_store::{decode_batch, encode_batch, BatchStore, StoreError};
use fanout_types::Batch;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory batch store for testing.
///
/// Every successful save is kept as its encoded bytes, so tests can inspect
/// each checkpoint exactly as it would have been written to disk. Writes can
/// be made to fail to exercise the non-fatal persistence path.
pub struct NullBatchStore {
    snapshots: Mutex<Vec<Vec<u8>>>,
    failed_writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl NullBatchStore {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(Vec::new()),
            failed_writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// A store that already holds `batch`.
    pub fn with_snapshot(batch: &Batch) -> Self {
        let store = Self::new();
        store
            .snapshots
            .lock()
            .unwrap()
            .push(encode_batch(batch).unwrap());
        store
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves, including a seeded snapshot.
    pub fn write_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    /// Number of saves that were rejected.
    pub fn failed_write_count(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }

    /// Every stored snapshot, oldest first.
    pub fn snapshots(&self) -> Vec<Batch> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|bytes| decode_batch(bytes).unwrap())
            .collect()
    }

    /// Raw bytes of every stored snapshot, oldest first.
    pub fn snapshot_bytes(&self) -> Vec<Vec<u8>> {
        self.snapshots.lock().unwrap().clone()
    }

    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<Batch> {
        self.snapshots().pop()
    }
}

impl Default for NullBatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStore for NullBatchStore {
    fn save(&self, batch: &Batch) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Io {
                path: self.location(),
                source: std::io::Error::other("simulated write failure"),
            });
        }
        let bytes = encode_batch(batch)?;
        self.snapshots.lock().unwrap().push(bytes);
        Ok(())
    }

    fn load(&self) -> Result<Batch, StoreError> {
        let snapshots = self.snapshots.lock().unwrap();
        let latest = snapshots
            .last()
            .ok_or_else(|| StoreError::NotFound(self.location()))?;
        decode_batch(latest)
    }

    fn location(&self) -> String {
        "memory://batch".to_string()
    }
}
