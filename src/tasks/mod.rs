//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a
//! cache.
//!
//! # Tasks
//! - Expiration sweeper: removes expired entries at the configured frequency

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweep, SweeperHandle};
