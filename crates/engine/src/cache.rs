//! Read cache and per-partition serialization
//!
//! # Design
//!
//! - [`ReadCache`]: bounded LRU of fetched rows. It only affects latency; a
//!   miss is always resolved by a backend fetch.
//! - [`PartitionLocks`]: one async mutex per partition with work in flight.
//!
//! # Coherence
//!
//! Every cache fill after a miss and every mutation runs while holding the
//! partition's lock, and mutations invalidate before they write. A read can
//! therefore never store rows fetched before an invalidating write through
//! the same store. Cache hits only take the short LRU lock.

use dashmap::DashMap;
use keyedstore_core::{CacheKey, Item};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Rows cached under one key
pub type CachedRows = Arc<Vec<Item>>;

/// Bounded least-recently-used cache of read results
pub struct ReadCache {
    entries: Mutex<LruCache<CacheKey, CachedRows>>,
}

impl ReadCache {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a key, marking it most recently used
    pub fn get(&self, key: &CacheKey) -> Option<CachedRows> {
        self.entries.lock().get(key).cloned()
    }

    /// Store rows under a key, evicting the least recently used entry if full
    pub fn insert(&self, key: CacheKey, rows: CachedRows) {
        self.entries.lock().put(key, rows);
    }

    /// Drop every entry a write to `partition` (at `sort`, if given) can make
    /// stale: partition-level entries, and entries for the written point in
    /// any projection. Returns the number of entries dropped.
    pub fn invalidate(&self, partition: &str, sort: Option<&str>) -> usize {
        let mut entries = self.entries.lock();
        let stale: Vec<CacheKey> = entries
            .iter()
            .map(|(key, _)| key)
            .filter(|key| {
                key.partition() == partition && (key.sort().is_none() || key.sort() == sort)
            })
            .cloned()
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        if !stale.is_empty() {
            debug!(partition, dropped = stale.len(), "invalidated cache entries");
        }
        stale.len()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Async mutexes keyed by rendered partition value.
///
/// Entries exist only while some task holds or waits for the lock.
#[derive(Default)]
pub struct PartitionLocks {
    locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl PartitionLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `partition`
    pub async fn lock(&self, partition: &str) -> PartitionGuard<'_> {
        let mutex = self
            .locks
            .entry(partition.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        PartitionGuard {
            guard: Some(guard),
            locks: self,
            partition: partition.to_string(),
        }
    }

    /// Number of partitions with a holder or waiter
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one partition; released on drop
pub struct PartitionGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a PartitionLocks,
    partition: String,
}

impl Drop for PartitionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map holds one reference; anything above that is a waiter.
        self.locks
            .locks
            .remove_if(&self.partition, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
