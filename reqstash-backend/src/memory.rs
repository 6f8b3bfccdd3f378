//! In-process backend implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use reqstash_core::{Fingerprint, StoredValue};
use serde_json::Value;
use tracing::trace;

use crate::{Backend, BackendResult};

/// In-memory store backend powered by [`DashMap`].
///
/// `MemoryBackend` keeps values in a concurrent hash map shared between
/// clones, so a clone handed to a client and a clone kept by the caller see
/// the same entries. It also counts reads and writes, which makes it handy
/// for asserting how a client talks to its store.
///
/// # Examples
///
/// ```
/// use reqstash_backend::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// assert!(backend.is_empty());
/// assert_eq!(backend.writes(), 0);
/// ```
///
/// # Caveats
///
/// - Data is **not persisted** and is lost on process restart
/// - Data is **not shared** across processes
/// - There is no eviction; entries live as long as the backend
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<DashMap<Fingerprint, Value>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("entries", &self.entries.len())
            .field("reads", &self.reads())
            .field("writes", &self.writes())
            .finish()
    }
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, as an external writer would.
    ///
    /// Seeding bypasses the write counter and stores the value verbatim, so
    /// store-internal fields such as `_id` can be simulated.
    pub fn insert_raw(&self, id: Fingerprint, value: Value) {
        self.entries.insert(id, value);
    }

    /// Returns a copy of the raw value stored under `id`.
    pub fn get(&self, id: &Fingerprint) -> Option<Value> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns how many reads went through the [`Backend`] interface.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns how many writes went through the [`Backend`] interface.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self, id: &Fingerprint) -> BackendResult<Option<Value>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let value = self.get(id);
        trace!(%id, hit = value.is_some(), "memory backend read");
        Ok(value)
    }

    async fn write(&self, id: &Fingerprint, value: &StoredValue) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(id.clone(), value.to_json());
        trace!(%id, "memory backend write");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
