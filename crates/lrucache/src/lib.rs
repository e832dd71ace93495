//! # lrucache
//!
//! Fixed-capacity, thread-safe LRU cache with hit/miss statistics.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to arena slot (O(1))
//! - **LRU List**: doubly-linked list over arena slots, recycled via a free list (O(1))
//! - **Locking**: one `parking_lot::Mutex` around index, list and counters
//!
//! Each `get`, `put` and `stats` call holds the lock for its whole duration.
//! A `get` never checks presence under a shared lock and then re-locks to
//! promote the entry, since a concurrent `put` could evict it in between.
//!
//! ## Example
//! ```
//! use lrucache::Cache;
//!
//! let cache = Cache::new(2);
//! cache.put("a".to_string(), 1);
//! cache.put("b".to_string(), 2);
//! cache.get("a");
//! cache.put("c".to_string(), 3); // evicts "b"
//!
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.get("a"), Some(1));
//!
//! let stats = cache.stats();
//! assert_eq!((stats.hits, stats.misses), (2, 1));
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod stats;

pub use cache::Cache;
pub use error::{Error, Result};
pub use lru::{Keys, LruCache};
pub use stats::CacheStats;
