//! Cache Handle Module
//!
//! Thread-safe cache combining the store, its lock, the clock and the
//! background sweeper into one Open -> Closed lifecycle.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tracing::debug;

use crate::cache::{
    CacheStats, CacheStore, Clock, Entry, ExpirationPolicy, MeasureUnit, TokioClock,
};
use crate::config::{CacheConfig, CacheOption};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, Sweep, SweeperHandle};

/// Lock-protected part of a cache.
#[derive(Debug)]
struct State<K, V> {
    store: CacheStore<K, V>,
    closed: bool,
}

/// Shared between the cache and its sweeper.
struct Shared<K, V> {
    state: RwLock<State<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Purges expired entries; None once the cache is closed.
    fn purge(&self) -> Option<usize> {
        let mut state = self.state.write();
        if state.closed {
            return None;
        }
        let now = self.clock.now();
        Some(state.store.purge_expired(now))
    }
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn sweep(&self) -> Option<usize> {
        self.purge()
    }
}

// == Cache ==
/// In-process key-value cache with TTL expiration, an optional LRU size bound
/// and a background sweeper.
///
/// All operations take `&self` and may be called from any thread. Reads of
/// `all`, `count` and `contains` share the lock; everything else takes it
/// exclusively.
///
/// Expired entries stay stored until a read finds them or the next sweep
/// runs, but they are never returned, listed or counted.
///
/// Once [`Cache::close`] has run, writes and `purify` do nothing, and reads
/// behave as if the cache were empty.
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    sweeper: Mutex<Option<SweeperHandle>>,
    empty: V,
    time_to_live: Duration,
    measure_unit: MeasureUnit,
    sweep_frequency: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Builder ==
    /// Starts building a cache from its required timing parameters.
    pub fn builder(
        sweep_frequency: Duration,
        time_to_live: Duration,
        measure_unit: MeasureUnit,
    ) -> CacheBuilder<K, V>
    where
        V: Default,
    {
        CacheBuilder::new(CacheConfig::new(sweep_frequency, time_to_live, measure_unit))
    }

    // == Configuration Accessors ==
    /// Value returned by [`Cache::fetch`] when a key is absent.
    pub fn empty_value(&self) -> &V {
        &self.empty
    }

    // == Time To Live ==
    /// Default TTL used by [`Cache::put`].
    pub fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    /// Default TTL expressed in the cache's measure unit.
    pub fn time_to_live_amount(&self) -> u128 {
        self.measure_unit.amount(self.time_to_live)
    }

    // == Measure Unit ==
    /// Granularity used to interpret raw duration amounts.
    pub fn measure_unit(&self) -> MeasureUnit {
        self.measure_unit
    }

    // == Sweep Frequency ==
    /// Interval between background sweeps.
    pub fn sweep_frequency(&self) -> Duration {
        self.sweep_frequency
    }

    // == Expire After Access ==
    /// Access-refresh window, or None when entries expire purely by TTL.
    pub fn expire_after_access(&self) -> Option<Duration> {
        self.shared.state.read().store.policy().access_window()
    }

    // == Put ==
    /// Inserts or replaces a value using the default TTL.
    pub fn put(&self, key: K, value: V) {
        self.put_ttl(key, value, self.time_to_live);
    }

    /// Inserts or replaces a value with its own TTL. A zero TTL stores an
    /// entry that is already expired.
    pub fn put_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut state = self.shared.state.write();
        if state.closed {
            return;
        }
        let now = self.shared.clock.now();
        state.store.insert_with_ttl(key, value, ttl, now);
    }

    /// Like [`Cache::put_ttl`] with the TTL given as an amount of the
    /// cache's measure unit. Zero or negative amounts expire immediately.
    pub fn put_ttl_amount(&self, key: K, value: V, amount: i64) {
        self.put_ttl(key, value, self.measure_unit.duration_saturating(amount));
    }

    // == Get ==
    /// Returns the live value for `key`, evicting it first if it expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.shared.state.write();
        if state.closed {
            return None;
        }
        let now = self.shared.clock.now();
        state.store.get(key, now)
    }

    /// Like [`Cache::get`], reporting absence as the empty value plus a
    /// `false` flag.
    pub fn fetch(&self, key: &K) -> (V, bool) {
        match self.get(key) {
            Some(value) => (value, true),
            None => (self.empty.clone(), false),
        }
    }

    /// Checks for a live entry without refreshing it.
    pub fn contains(&self, key: &K) -> bool {
        let state = self.shared.state.read();
        !state.closed && state.store.contains(key, self.shared.clock.now())
    }

    // == Invalidate ==
    /// Removes `key` if present.
    pub fn invalidate(&self, key: &K) {
        let mut state = self.shared.state.write();
        if !state.closed {
            state.store.remove(key);
        }
    }

    /// Removes every entry.
    pub fn invalidate_all(&self) {
        let mut state = self.shared.state.write();
        if !state.closed {
            state.store.clear();
        }
    }

    // == Enumerate ==
    /// Snapshot of every live entry, in no particular order.
    pub fn all(&self) -> Vec<Entry<K, V>> {
        let state = self.shared.state.read();
        if state.closed {
            return Vec::new();
        }
        state.store.snapshot(self.shared.clock.now())
    }

    /// Number of live entries.
    pub fn count(&self) -> usize {
        let state = self.shared.state.read();
        if state.closed {
            return 0;
        }
        state.store.live_count(self.shared.clock.now())
    }

    // == Purify ==
    /// Runs a sweep right now. Returns how many expired entries were removed.
    pub fn purify(&self) -> usize {
        self.shared.purge().unwrap_or(0)
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.state.read().store.stats()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.read().closed
    }

    // == Close ==
    /// Stops the sweeper and releases every entry. Idempotent.
    ///
    /// When this returns no further sweep can touch the store: the closed
    /// flag is set under the store lock, and sweeps check it under that lock.
    pub fn close(&self) {
        {
            let mut state = self.shared.state.write();
            if state.closed {
                return;
            }
            state.closed = true;
            let released = state.store.clear();
            debug!(released, "Cache closed");
        }

        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.stop();
        }
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        self.shared.state.write().closed = true;
        if let Some(sweeper) = self.sweeper.get_mut().take() {
            sweeper.stop();
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("time_to_live", &self.time_to_live)
            .field("measure_unit", &self.measure_unit)
            .field("sweep_frequency", &self.sweep_frequency)
            .field("closed", &self.shared.state.read().closed)
            .finish_non_exhaustive()
    }
}

// == Cache Builder ==
/// Collects configuration, the empty value, the clock and the runtime before
/// starting a cache.
pub struct CacheBuilder<K, V> {
    config: CacheConfig,
    empty: V,
    clock: Arc<dyn Clock>,
    runtime: Option<Handle>,
    _key: std::marker::PhantomData<fn() -> K>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Starts from `config`, with `V::default()` as the empty value.
    pub fn new(config: CacheConfig) -> Self
    where
        V: Default,
    {
        Self::with_empty_value(config, V::default())
    }

    pub fn with_empty_value(config: CacheConfig, empty: V) -> Self {
        Self {
            config,
            empty,
            clock: Arc::new(TokioClock),
            runtime: None,
            _key: std::marker::PhantomData,
        }
    }

    pub fn empty_value(mut self, empty: V) -> Self {
        self.empty = empty;
        self
    }

    pub fn option(mut self, option: CacheOption) -> Self {
        option.apply(&mut self.config);
        self
    }

    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = CacheOption>,
    {
        self.config = self.config.apply(options);
        self
    }

    pub fn max_size(self, n: usize) -> Self {
        self.option(CacheOption::MaxSize(n))
    }

    pub fn expire_after_access(self, window: Duration) -> Self {
        self.option(CacheOption::ExpireAfterAccess(window))
    }

    /// Replaces the time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runtime that hosts the sweeper. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    // == Build ==
    /// Validates the configuration and starts the sweeper.
    pub fn build(self) -> Result<Cache<K, V>> {
        self.config.validate()?;
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| CacheError::MissingRuntime)?,
        };

        let config = self.config;
        let store = CacheStore::new(
            config.max_size,
            config.time_to_live,
            ExpirationPolicy::from_access_window(config.expire_after_access),
        );
        let shared = Arc::new(Shared {
            state: RwLock::new(State {
                store,
                closed: false,
            }),
            clock: self.clock,
        });
        let sweeper = spawn_sweeper(&runtime, shared.clone(), config.sweep_frequency);

        debug!(
            sweep_frequency = ?config.sweep_frequency,
            time_to_live = ?config.time_to_live,
            measure_unit = %config.measure_unit,
            max_size = ?config.max_size,
            expire_after_access = ?config.expire_after_access,
            "Cache created"
        );

        Ok(Cache {
            shared,
            sweeper: Mutex::new(Some(sweeper)),
            empty: self.empty,
            time_to_live: config.time_to_live,
            measure_unit: config.measure_unit,
            sweep_frequency: config.sweep_frequency,
        })
    }
}
