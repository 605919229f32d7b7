//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Absence of a key is never an error: lookups report it through `Option`
/// or a found flag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Construction parameters that would yield a cache that never sweeps
    /// or never expires
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Measure unit code or name that maps to no known granularity
    #[error("Unknown measure unit: {0}")]
    UnknownMeasureUnit(String),

    /// No tokio runtime available to host the sweeper task
    #[error("No tokio runtime available to run the sweeper")]
    MissingRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
