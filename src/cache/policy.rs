//! Expiration Policy Module
//!
//! Decides when an entry is dead. Lazy eviction on reads and the sweeper both
//! go through [`ExpirationPolicy::is_expired`].

use std::time::{Duration, Instant};

use crate::cache::CacheEntry;

// == Expiration Policy ==
/// Time-based expiration mode, fixed for the lifetime of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpirationPolicy {
    /// Entries die at write time plus their TTL.
    #[default]
    TimeToLive,
    /// Entries start with their TTL, and every successful read pushes the
    /// deadline to read time plus the window.
    AfterAccess(Duration),
}

impl ExpirationPolicy {
    /// Builds the policy from the optional access window.
    pub fn from_access_window(window: Option<Duration>) -> Self {
        window.map_or(ExpirationPolicy::TimeToLive, ExpirationPolicy::AfterAccess)
    }

    // == Is Expired ==
    /// Checks an entry against the policy at `now`.
    pub fn is_expired<V>(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        entry.is_expired(now)
    }

    // == On Access ==
    /// Updates an entry's metadata after a successful read.
    pub fn on_access<V>(&self, entry: &mut CacheEntry<V>, now: Instant) {
        match self {
            ExpirationPolicy::TimeToLive => entry.touch(now, None),
            ExpirationPolicy::AfterAccess(window) => entry.touch(now, Some(*window)),
        }
    }

    /// Access window when access-refresh expiry is active.
    pub fn access_window(&self) -> Option<Duration> {
        match self {
            ExpirationPolicy::TimeToLive => None,
            ExpirationPolicy::AfterAccess(window) => Some(*window),
        }
    }
}
