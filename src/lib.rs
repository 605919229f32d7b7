//! Expiring Cache - an in-process key-value cache
//!
//! Entries expire after a time-to-live, or after a window of inactivity when
//! access-refresh expiration is enabled. An optional maximum size evicts the
//! least recently used entry, and a background tokio task sweeps expired
//! entries at a fixed frequency.
//!
//! ```ignore
//! use std::time::Duration;
//! use expiring_cache::{new_string_key_cache, with_max_size, MeasureUnit};
//!
//! let cache = new_string_key_cache::<u64, _>(
//!     Duration::from_secs(1),
//!     Duration::from_secs(300),
//!     MeasureUnit::Seconds,
//!     [with_max_size(1_000)],
//! );
//! cache.put("answer".to_string(), 42);
//! assert_eq!(cache.get(&"answer".to_string()), Some(42));
//! cache.close();
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod factory;
pub mod tasks;

pub use cache::{
    Cache, CacheBuilder, CacheStats, Clock, Entry, ManualClock, MeasureUnit, TokioClock,
};
pub use config::{CacheConfig, CacheOption};
pub use error::{CacheError, Result};
pub use factory::{
    new_number_key_cache, new_string_key_cache, with_expire_after_access, with_max_size,
    NumberKeyCache, StringKeyCache,
};
