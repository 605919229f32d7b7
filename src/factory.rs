//! Typed cache constructors
//!
//! Ready-made caches keyed by text or by number, configured through
//! [`CacheOption`] values.

use std::time::Duration;

use crate::cache::{Cache, CacheBuilder, MeasureUnit};
use crate::config::{CacheConfig, CacheOption};

/// Cache keyed by text.
pub type StringKeyCache<V> = Cache<String, V>;

/// Cache keyed by number.
pub type NumberKeyCache<V> = Cache<i64, V>;

/// Bounds the cache to `n` entries, evicting the least recently used.
pub fn with_max_size(n: usize) -> CacheOption {
    CacheOption::MaxSize(n)
}

/// Makes every successful read push the entry's deadline to `window` past
/// the read.
pub fn with_expire_after_access(window: Duration) -> CacheOption {
    CacheOption::ExpireAfterAccess(window)
}

/// Creates a text-keyed cache and starts its sweeper on the current tokio
/// runtime. The empty value is `V::default()`.
///
/// # Panics
///
/// Panics if `sweep_frequency` is zero or no tokio runtime is running.
pub fn new_string_key_cache<V, I>(
    sweep_frequency: Duration,
    time_to_live: Duration,
    unit: MeasureUnit,
    options: I,
) -> StringKeyCache<V>
where
    V: Clone + Default + Send + Sync + 'static,
    I: IntoIterator<Item = CacheOption>,
{
    build_or_panic(sweep_frequency, time_to_live, unit, options)
}

/// Creates a number-keyed cache and starts its sweeper on the current tokio
/// runtime. The empty value is `V::default()`.
///
/// # Panics
///
/// Panics if `sweep_frequency` is zero or no tokio runtime is running.
pub fn new_number_key_cache<V, I>(
    sweep_frequency: Duration,
    time_to_live: Duration,
    unit: MeasureUnit,
    options: I,
) -> NumberKeyCache<V>
where
    V: Clone + Default + Send + Sync + 'static,
    I: IntoIterator<Item = CacheOption>,
{
    build_or_panic(sweep_frequency, time_to_live, unit, options)
}

fn build_or_panic<K, V, I>(
    sweep_frequency: Duration,
    time_to_live: Duration,
    unit: MeasureUnit,
    options: I,
) -> Cache<K, V>
where
    K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
    I: IntoIterator<Item = CacheOption>,
{
    let config = CacheConfig::new(sweep_frequency, time_to_live, unit).apply(options);
    match CacheBuilder::new(config).build() {
        Ok(cache) => cache,
        Err(e) => panic!("cannot create cache: {e}"),
    }
}
