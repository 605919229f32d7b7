//! Configuration Module
//!
//! Cache construction parameters, the option values callers pass to the
//! constructors, and loading from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::MeasureUnit;
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Interval between background sweeps
    pub sweep_frequency: Duration,
    /// Default TTL for entries written without an explicit one
    pub time_to_live: Duration,
    /// Granularity used to interpret raw duration amounts
    pub measure_unit: MeasureUnit,
    /// Maximum number of entries, None = unbounded
    pub max_size: Option<usize>,
    /// Access-refresh window; when set, reads push the deadline forward
    pub expire_after_access: Option<Duration>,
}

impl CacheConfig {
    /// Creates a config with the given timing and no options applied.
    pub fn new(
        sweep_frequency: Duration,
        time_to_live: Duration,
        measure_unit: MeasureUnit,
    ) -> Self {
        Self {
            sweep_frequency,
            time_to_live,
            measure_unit,
            max_size: None,
            expire_after_access: None,
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// Durations are amounts in the configured measure unit.
    ///
    /// # Environment Variables
    /// - `CACHE_MEASURE_UNIT` - Unit code 0..=3 or name (default: seconds)
    /// - `CACHE_SWEEP_FREQUENCY` - Sweep interval (default: 1 second)
    /// - `CACHE_TIME_TO_LIVE` - Default TTL (default: 300 seconds)
    /// - `CACHE_MAX_SIZE` - Maximum entries (default: unbounded)
    /// - `CACHE_EXPIRE_AFTER_ACCESS` - Access-refresh window (default: off)
    ///
    /// Unset variables fall back to the defaults; malformed or negative
    /// values are rejected.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`CacheConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let measure_unit = match lookup("CACHE_MEASURE_UNIT") {
            Some(raw) => raw.parse()?,
            None => defaults.measure_unit,
        };
        let amount = |name: &str| -> Result<Option<Duration>> {
            lookup(name)
                .map(|raw| parse_amount(name, &raw).map(|n| measure_unit.duration(n)))
                .transpose()
        };

        let config = Self {
            sweep_frequency: amount("CACHE_SWEEP_FREQUENCY")?.unwrap_or(defaults.sweep_frequency),
            time_to_live: amount("CACHE_TIME_TO_LIVE")?.unwrap_or(defaults.time_to_live),
            measure_unit,
            max_size: lookup("CACHE_MAX_SIZE")
                .map(|raw| parse_size("CACHE_MAX_SIZE", &raw))
                .transpose()?,
            expire_after_access: amount("CACHE_EXPIRE_AFTER_ACCESS")?,
        };
        config.validate()?;
        Ok(config)
    }

    // == Options ==
    /// Applies options in order; later options override earlier ones.
    pub fn apply<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = CacheOption>,
    {
        for option in options {
            option.apply(&mut self);
        }
        self
    }

    // == Validate ==
    /// Rejects parameters that would yield a cache that never sweeps.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_frequency.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "sweep frequency must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Default TTL expressed in the measure unit.
    pub fn time_to_live_amount(&self) -> u128 {
        self.measure_unit.amount(self.time_to_live)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(300), MeasureUnit::Seconds)
    }
}

// == Cache Option ==
/// Optional construction setting, applied on top of a [`CacheConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOption {
    /// Bounds the number of entries and enables LRU eviction.
    MaxSize(usize),
    /// Switches to access-refresh expiration with the given window.
    ExpireAfterAccess(Duration),
}

impl CacheOption {
    /// Writes this option into `config`.
    pub fn apply(self, config: &mut CacheConfig) {
        match self {
            CacheOption::MaxSize(n) => config.max_size = Some(n),
            CacheOption::ExpireAfterAccess(window) => config.expire_after_access = Some(window),
        }
    }
}

fn parse_amount(name: &str, raw: &str) -> Result<u64> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        CacheError::InvalidConfiguration(format!("{name}: not an integer: {raw:?}"))
    })?;
    u64::try_from(value)
        .map_err(|_| CacheError::InvalidConfiguration(format!("{name}: negative value {value}")))
}

fn parse_size(name: &str, raw: &str) -> Result<usize> {
    let value = parse_amount(name, raw)?;
    usize::try_from(value).map_err(|_| {
        CacheError::InvalidConfiguration(format!("{name}: {value} does not fit this platform"))
    })
}
