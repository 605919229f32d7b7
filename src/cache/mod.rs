//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, access-refresh expiration
//! and LRU eviction.

mod clock;
mod entry;
mod handle;
mod lru;
mod policy;
mod stats;
mod store;
mod unit;


// Re-export public types
pub use clock::{Clock, ManualClock, TokioClock};
pub use entry::{CacheEntry, Entry};
pub use handle::{Cache, CacheBuilder};
pub use lru::LruTracker;
pub use policy::ExpirationPolicy;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use unit::MeasureUnit;
