//! Measure Unit Module
//!
//! Time granularity used to interpret raw duration amounts handed to a cache.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Measure Unit ==
/// Granularity used to interpret numeric durations.
///
/// This is purely an interpretation convention. Stored timestamps always keep
/// the full resolution of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MeasureUnit {
    Nanos = 0,
    Micros = 1,
    Millis = 2,
    #[default]
    Seconds = 3,
}

impl MeasureUnit {
    /// All units, ordered by their numeric code.
    pub const ALL: [MeasureUnit; 4] = [
        MeasureUnit::Nanos,
        MeasureUnit::Micros,
        MeasureUnit::Millis,
        MeasureUnit::Seconds,
    ];

    // == Code ==
    /// Numeric code of the unit (`0=nanos 1=micros 2=millis 3=seconds`).
    pub fn code(self) -> u8 {
        self as u8
    }

    // == Duration ==
    /// Converts an amount expressed in this unit into a `Duration`.
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            MeasureUnit::Nanos => Duration::from_nanos(amount),
            MeasureUnit::Micros => Duration::from_micros(amount),
            MeasureUnit::Millis => Duration::from_millis(amount),
            MeasureUnit::Seconds => Duration::from_secs(amount),
        }
    }

    /// Converts a signed amount; zero and negative amounts collapse to
    /// `Duration::ZERO`.
    pub fn duration_saturating(self, amount: i64) -> Duration {
        self.duration(amount.max(0) as u64)
    }

    // == Amount ==
    /// Expresses a duration as a whole number of this unit, truncating any
    /// remainder.
    pub fn amount(self, duration: Duration) -> u128 {
        match self {
            MeasureUnit::Nanos => duration.as_nanos(),
            MeasureUnit::Micros => duration.as_micros(),
            MeasureUnit::Millis => duration.as_millis(),
            MeasureUnit::Seconds => duration.as_secs() as u128,
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasureUnit::Nanos => "NANOS",
            MeasureUnit::Micros => "MICROS",
            MeasureUnit::Millis => "MILLS",
            MeasureUnit::Seconds => "SECONDS",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for MeasureUnit {
    type Error = CacheError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MeasureUnit::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| CacheError::UnknownMeasureUnit(code.to_string()))
    }
}

impl FromStr for MeasureUnit {
    type Err = CacheError;

    /// Accepts the numeric code or a unit name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return MeasureUnit::try_from(code);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(MeasureUnit::Nanos),
            "us" | "micros" | "microseconds" => Ok(MeasureUnit::Micros),
            "ms" | "mills" | "millis" | "milliseconds" => Ok(MeasureUnit::Millis),
            "s" | "secs" | "seconds" => Ok(MeasureUnit::Seconds),
            _ => Err(CacheError::UnknownMeasureUnit(trimmed.to_string())),
        }
    }
}
