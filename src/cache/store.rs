//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL
//! expiration. The store is not synchronized; [`crate::Cache`] wraps it in a
//! lock. Every time-dependent operation takes `now` from the caller.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, Entry, ExpirationPolicy, LruTracker};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker, present only when the store is size-bound
    lru: Option<LruTracker<K>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed, None = unbounded
    max_entries: Option<usize>,
    /// TTL applied by `insert` when the caller gives none
    default_ttl: Duration,
    /// Active time-based expiration mode
    policy: ExpirationPolicy,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Optional bound on the number of stored entries
    /// * `default_ttl` - TTL for entries written without an explicit one
    /// * `policy` - Time-based expiration mode
    pub fn new(
        max_entries: Option<usize>,
        default_ttl: Duration,
        policy: ExpirationPolicy,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            lru: max_entries.map(|_| LruTracker::new()),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            policy,
        }
    }

    // == Insert ==
    /// Stores a key-value pair with the default TTL.
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.insert_with_ttl(key, value, self.default_ttl, now);
    }

    // == Insert With TTL ==
    /// Stores a key-value pair living for `ttl` from `now`.
    ///
    /// If the key already exists, the value is replaced in place and its TTL
    /// and recency are reset. If the store is at capacity, expired entries are
    /// reclaimed first, and only if that frees no slot is the least recently
    /// used entry evicted. A zero capacity drops every write.
    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl: Duration, now: Instant) {
        if self.max_entries == Some(0) {
            self.stats.record_eviction();
            trace!("Cache has zero capacity, dropping write");
            return;
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.is_full() {
            self.remove_expired(now);
            if self.is_full() {
                self.evict_oldest();
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl, now));
        if let Some(lru) = self.lru.as_mut() {
            lru.touch(&key);
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&mut self, key: &K, now: Instant) -> Option<V> {
        let policy = self.policy;
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return None;
        };

        if policy.is_expired(entry, now) {
            self.expire(key);
            self.stats.record_miss();
            return None;
        }

        policy.on_access(entry, now);
        let value = entry.value.clone();
        if let Some(lru) = self.lru.as_mut() {
            lru.touch(key);
        }
        self.stats.record_hit();
        Some(value)
    }

    // == Contains ==
    /// Checks for a live entry without counting a read or touching recency.
    pub fn contains(&self, key: &K, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !self.policy.is_expired(entry, now))
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_some() {
            if let Some(lru) = self.lru.as_mut() {
                lru.remove(key);
            }
            self.stats.set_total_entries(self.entries.len());
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        if let Some(lru) = self.lru.as_mut() {
            lru.clear();
        }
        self.stats.set_total_entries(0);
        dropped
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store and records a sweep.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let removed = self.remove_expired(now);
        self.stats.record_sweep();
        removed
    }

    // == Snapshot ==
    /// Copies out every live entry.
    pub fn snapshot(&self, now: Instant) -> Vec<Entry<K, V>> {
        self.entries
            .iter()
            .filter(|(_, entry)| !self.policy.is_expired(entry, now))
            .map(|(key, entry)| Entry::new(key.clone(), entry.value.clone()))
            .collect()
    }

    // == Live Count ==
    /// Number of entries that have not expired at `now`.
    pub fn live_count(&self, now: Instant) -> usize {
        self.entries
            .values()
            .filter(|entry| !self.policy.is_expired(entry, now))
            .count()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if nothing is stored, expired or not.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Default TTL ==
    /// TTL applied by [`CacheStore::insert`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Policy ==
    /// Returns the active time-based expiration mode.
    pub fn policy(&self) -> ExpirationPolicy {
        self.policy
    }

    // == Expire ==
    /// Removal path shared by lazy eviction, purging and slot reclaiming.
    fn expire(&mut self, key: &K) {
        if self.remove(key) {
            self.stats.record_expirations(1);
        }
    }

    // == Remove Expired ==
    /// Removes every entry expired at `now`, returning how many went away.
    fn remove_expired(&mut self, now: Instant) -> usize {
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.policy.is_expired(entry, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.expire(key);
        }
        expired_keys.len()
    }

    // == Is Full ==
    /// Whether a new key would exceed the size bound.
    fn is_full(&self) -> bool {
        self.max_entries.is_some_and(|max| self.entries.len() >= max)
    }

    // == Evict Oldest ==
    /// Drops the least recently used entry to make room.
    fn evict_oldest(&mut self) {
        let Some(evicted) = self.lru.as_mut().and_then(|lru| lru.evict_oldest()) else {
            return;
        };
        self.entries.remove(&evicted);
        self.stats.record_eviction();
        trace!(size = self.entries.len(), "Evicted least recently used entry");
    }
}
