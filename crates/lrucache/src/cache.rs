//! Cache: thread-safe LRU cache with hit/miss accounting

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::lru::LruCache;
use crate::stats::{CacheStats, Counters};

/// State guarded by the cache lock
struct Inner<K, V> {
    lru: LruCache<K, V>,
    counters: Counters,
}

/// Fixed-capacity LRU cache safe to share between threads
///
/// Every public operation runs start to finish under a single exclusive
/// lock: the presence check, the recency update and the counter update are
/// one critical section. A `get` hit reorders the recency list, so there is
/// no read-only path and no reader/writer split.
pub struct Cache<K, V> {
    /// Index, recency list and counters
    inner: Mutex<Inner<K, V>>,

    /// Cache capacity, immutable after construction
    capacity: usize,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new cache holding at most `capacity` entries
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries; 0 yields a cache that stores nothing
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "creating LRU cache");

        Self {
            inner: Mutex::new(Inner {
                lru: LruCache::new(capacity),
                counters: Counters::default(),
            }),
            capacity,
        }
    }

    /// Look up a value, marking it most recently used on a hit
    ///
    /// Records exactly one hit or one miss.
    ///
    /// # Returns
    /// * `Option<V>` - A clone of the stored value, or `None` on a miss
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut inner = self.inner.lock();
        let Inner { lru, counters } = &mut *inner;

        match lru.get(key) {
            Some(value) => {
                counters.record_hit();
                Some(value.clone())
            }
            None => {
                counters.record_miss();
                None
            }
        }
    }

    /// Insert or overwrite a value, marking it most recently used
    ///
    /// Inserting a new key into a full cache evicts the least recently
    /// used entry. Does not affect hit/miss counters.
    pub fn put(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let evicted = self.inner.lock().lru.put(key, value);

        // Evicted entry is dropped here, after the lock is released.
        drop(evicted);
    }

    /// Get cumulative hit/miss statistics
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().counters.snapshot()
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Verify the internal structure under the lock
    pub fn check_invariants(&self) -> Result<()> {
        self.inner.lock().lru.check_invariants()
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Cache")
            .field("capacity", &self.capacity)
            .field("len", &inner.lru.len())
            .field("stats", &inner.counters.snapshot())
            .finish()
    }
}
