//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for size-bound eviction.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch stamps the key with a fresh, strictly increasing sequence
/// number, so the smallest stamp is always the least recently used key and
/// ties cannot occur. A key that was never read is ordered by its insertion.
#[derive(Debug)]
pub struct LruTracker<K> {
    /// Keys ordered by their last stamp (first = least recently used)
    order: BTreeMap<u64, K>,
    /// Current stamp of every tracked key
    stamps: HashMap<K, u64>,
    /// Next stamp to hand out
    next_stamp: u64,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self {
            order: BTreeMap::new(),
            stamps: HashMap::new(),
            next_stamp: 0,
        }
    }
}

impl<K> LruTracker<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, adding it if untracked.
    pub fn touch(&mut self, key: &K) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        match self.stamps.get_mut(key) {
            Some(previous) => {
                if let Some(k) = self.order.remove(previous) {
                    self.order.insert(stamp, k);
                }
                *previous = stamp;
            }
            None => {
                self.stamps.insert(key.clone(), stamp);
                self.order.insert(stamp, key.clone());
            }
        }
    }

    // == Remove ==
    /// Removes a key from the tracker. Unknown keys are ignored.
    pub fn remove(&mut self, key: &K) {
        if let Some(stamp) = self.stamps.remove(key) {
            self.order.remove(&stamp);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.first_key_value().map(|(_, key)| key)
    }

    // == Clear ==
    /// Forgets every tracked key.
    pub fn clear(&mut self) {
        self.order.clear();
        self.stamps.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Returns true when no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    // == Contains ==
    /// Checks whether a key is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.stamps.contains_key(key)
    }
}
