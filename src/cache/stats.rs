//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted due to the size bound
    pub evictions: u64,
    /// Number of expired entries removed, lazily or by a sweep
    pub expirations: u64,
    /// Number of completed sweeps
    pub sweeps: u64,
    /// Entries currently stored, including expired ones not yet swept
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Events ==
    /// Records a successful retrieval.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records a failed retrieval.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records one entry dropped by the size bound.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records `count` expired entries removed at once.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    /// Records a completed sweep, whether or not it removed anything.
    pub fn record_sweep(&mut self) {
        self.sweeps += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
