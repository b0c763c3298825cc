//! Configuration selectors and unit conversion primitives.

use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Identifies one of a parser's configuration records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    /// Whichever record is currently selected.
    Current,
    /// The record filled from negotiated caps.
    Negotiated,
    /// The record filled from user-set properties.
    Properties,
}

impl ConfigKind {
    /// Resolve [`ConfigKind::Current`] against the active selection.
    pub fn resolve(self, current: ConfigKind) -> ConfigKind {
        match self {
            ConfigKind::Current => current,
            other => other,
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigKind::Current => "current",
            ConfigKind::Negotiated => "negotiated",
            ConfigKind::Properties => "properties",
        })
    }
}

/// Units a stream position can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFormat {
    /// Byte offset into the payload, excluding any frame overhead.
    Bytes,
    /// Native frame count: samples for audio, images for video.
    Default,
    /// Nanoseconds.
    Time,
    /// Percentage of the stream.
    Percent,
}

/// A rational rate of units per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitsPerSecond {
    pub numer: u64,
    pub denom: u64,
}

impl UnitsPerSecond {
    pub const fn new(numer: u64, denom: u64) -> Self {
        Self { numer, denom }
    }

    /// A rate with a zero numerator or denominator cannot time anything.
    pub fn is_defined(&self) -> bool {
        self.numer > 0 && self.denom > 0
    }

    /// Nanoseconds covered by `units`; `None` if undefined or out of range.
    pub fn units_to_nanos(&self, units: u64) -> Option<u128> {
        if !self.is_defined() {
            return None;
        }
        (units as u128)
            .checked_mul(NANOS_PER_SEC)?
            .checked_mul(self.denom as u128)
            .map(|scaled| scaled / self.numer as u128)
    }

    /// Whole units that fit into `nanos`; `None` if undefined or out of
    /// range.
    pub fn nanos_to_units(&self, nanos: u128) -> Option<u64> {
        if !self.is_defined() {
            return None;
        }
        let units = nanos.checked_mul(self.numer as u128)?
            / NANOS_PER_SEC.checked_mul(self.denom as u128)?;
        u64::try_from(units).ok()
    }

    /// Duration covered by `units` at this rate, rounded down to whole ns.
    pub fn units_to_duration(&self, units: u64) -> Option<Duration> {
        let nanos = self.units_to_nanos(units)?;
        Some(Duration::from_nanos(u64::try_from(nanos).ok()?))
    }

    /// Number of whole units that fit into `duration` at this rate.
    pub fn duration_to_units(&self, duration: Duration) -> Option<u64> {
        self.nanos_to_units(duration.as_nanos())
    }
}

impl fmt::Display for UnitsPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}
