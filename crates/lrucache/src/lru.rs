//! LRU (Least Recently Used) cache core
//!
//! Nodes live in an arena addressed by slot index. The key index maps each
//! key to its slot and the recency list is a doubly-linked chain of slots
//! running from `head` (most recent) to `tail` (next eviction). Freed slots
//! are recycled through the free list, so the arena never grows past the
//! capacity.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::iter::FusedIterator;

use ahash::RandomState;
use tracing::trace;

use crate::error::{Error, Result};

/// Upper bound on up-front allocation for very large capacities
const MAX_PREALLOC: usize = 64 * 1024;

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache with fixed capacity
///
/// Not synchronized; see [`Cache`](crate::Cache) for the thread-safe wrapper.
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// A capacity of 0 is allowed and yields a cache that never stores anything.
    pub fn new(capacity: usize) -> Self {
        let prealloc = capacity.min(MAX_PREALLOC);

        Self {
            map: HashMap::with_capacity_and_hasher(prealloc, RandomState::new()),
            nodes: Vec::with_capacity(prealloc),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Insert a key-value pair into the cache
    ///
    /// Returns the entry evicted to make room, if any. Overwriting an
    /// existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.push_front(idx);
        self.map.insert(key, idx);

        evicted
    }

    /// Key of the next eviction candidate, without touching recency
    pub fn peek_lru(&self) -> Option<&K> {
        self.tail
            .and_then(|idx| self.nodes[idx].as_ref())
            .map(|node| &node.key)
    }

    /// Iterate over keys from most to least recently used, without touching recency
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.map.len(),
        }
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Walk the arena and verify the index and recency list agree
    pub fn check_invariants(&self) -> Result<()> {
        if self.map.len() > self.capacity {
            return Err(Error::OverCapacity {
                len: self.map.len(),
                capacity: self.capacity,
            });
        }

        let mut linked = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(idx) = current {
            linked += 1;
            if linked > self.nodes.len() {
                return Err(Error::BrokenLink { slot: idx });
            }

            let node = self
                .nodes
                .get(idx)
                .and_then(Option::as_ref)
                .ok_or(Error::DanglingSlot { slot: idx })?;
            if node.prev != prev {
                return Err(Error::BrokenLink { slot: idx });
            }
            if self.map.get(&node.key) != Some(&idx) {
                return Err(Error::KeyMismatch { slot: idx });
            }

            prev = Some(idx);
            current = node.next;
        }

        if self.tail != prev {
            return Err(Error::TailMismatch {
                expected: prev,
                actual: self.tail,
            });
        }

        if linked != self.map.len() {
            return Err(Error::LengthMismatch {
                indexed: self.map.len(),
                linked,
            });
        }

        for &slot in &self.free_list {
            if matches!(self.nodes.get(slot), Some(Some(_))) {
                return Err(Error::OccupiedFreeSlot { slot });
            }
        }

        Ok(())
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at front
        }

        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &self.nodes[idx] {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;

        // Unlink while the node is still in its slot so neighbours get patched.
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.map.remove(&node.key);
        self.free_node(idx);

        trace!(slot = idx, "evicted least recently used entry");
        Some((node.key, node.value))
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}

/// Iterator over cache keys in recency order, created by [`LruCache::keys`]
pub struct Keys<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let idx = self.cursor?;
        let node = self.nodes.get(idx)?.as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Put(u8, u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..16).prop_map(Op::Get),
            (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        ]
    }

    /// Reference LRU: front of the vector is most recently used.
    struct Model {
        capacity: usize,
        entries: Vec<(u8, u32)>,
    }

    impl Model {
        fn get(&mut self, key: u8) -> Option<u32> {
            let pos = self.entries.iter().position(|&(k, _)| k == key)?;
            let entry = self.entries.remove(pos);
            self.entries.insert(0, entry);
            Some(entry.1)
        }

        fn put(&mut self, key: u8, value: u32) -> Option<(u8, u32)> {
            if self.capacity == 0 {
                return None;
            }
            if let Some(pos) = self.entries.iter().position(|&(k, _)| k == key) {
                self.entries.remove(pos);
                self.entries.insert(0, (key, value));
                return None;
            }
            let evicted = if self.entries.len() >= self.capacity {
                self.entries.pop()
            } else {
                None
            };
            self.entries.insert(0, (key, value));
            evicted
        }
    }

    proptest! {
        /// Every step matches the reference model and keeps invariants.
        #[test]
        fn prop_matches_reference_model(
            capacity in 0usize..8,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let mut cache = LruCache::new(capacity);
            let mut model = Model { capacity, entries: Vec::new() };

            for op in ops {
                match op {
                    Op::Get(k) => prop_assert_eq!(cache.get(&k).copied(), model.get(k)),
                    Op::Put(k, v) => prop_assert_eq!(cache.put(k, v), model.put(k, v)),
                }

                prop_assert!(cache.len() <= capacity);
                prop_assert!(cache.check_invariants().is_ok());
                let keys: Vec<u8> = cache.keys().copied().collect();
                let expected: Vec<u8> = model.entries.iter().map(|&(k, _)| k).collect();
                prop_assert_eq!(keys, expected);
            }
        }

        /// C + 1 distinct inserts evict exactly the first key.
        #[test]
        fn prop_first_inserted_is_evicted(capacity in 1usize..64) {
            let mut cache = LruCache::new(capacity);
            for k in 0..capacity {
                prop_assert_eq!(cache.put(k, k), None);
            }
            prop_assert_eq!(cache.put(capacity, capacity), Some((0, 0)));
            for k in 1..=capacity {
                prop_assert_eq!(cache.get(&k), Some(&k));
            }
        }
    }
}
