//! Cache Entry Module
//!
//! Defines the stored entry with its expiration metadata, and the snapshot
//! type handed out by enumeration.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single stored value with its timing metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Last successful read, or the write time if never read
    pub last_accessed_at: Instant,
    /// Deadline after which the entry is dead, None = never expires
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now` living for `ttl`.
    ///
    /// A TTL too large to represent as an instant means the entry never
    /// expires.
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            last_accessed_at: now,
            expires_at: now.checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so a
    /// zero TTL is dead immediately.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Records a successful read, optionally sliding the deadline to
    /// `now + window`.
    pub fn touch(&mut self, now: Instant, window: Option<Duration>) {
        self.last_accessed_at = now;
        if let Some(window) = window {
            self.expires_at = now.checked_add(window);
        }
    }

    // == Time To Live ==
    /// Returns remaining lifetime, or None if the entry never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|expires| expires.saturating_duration_since(now))
    }
}

// == Entry Snapshot ==
/// Key and value copied out of a cache by `Cache::all`.
///
/// The `Debug` output doubles as the entry's diagnostic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    data: V,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a snapshot from a key and a copy of its value.
    pub fn new(key: K, data: V) -> Self {
        Self { key, data }
    }

    // == Key ==
    /// Returns the key of the snapshot.
    pub fn key(&self) -> &K {
        &self.key
    }

    // == Data ==
    /// Returns the value held when the snapshot was taken.
    pub fn data(&self) -> &V {
        &self.data
    }

    // == Into Parts ==
    /// Splits the snapshot into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.data)
    }
}
