//! Epoch arithmetic.
//!
//! The destination chain publishes `(epochStart, epochPeriod)`. Epoch `i` covers the half-open
//! interval `[epochStart + i * epochPeriod, epochStart + (i + 1) * epochPeriod)`.

use serde::{Deserialize, Serialize};

use crate::{
    errors::EpochError,
    types::{EpochIndex, UnixTimestamp},
};

/// The on-chain epoch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochConfig {
    start: UnixTimestamp,
    period: u64,
}

impl EpochConfig {
    /// Creates a new configuration. `period` is in seconds and must be positive.
    pub const fn new(start: UnixTimestamp, period: u64) -> Result<Self, EpochError> {
        if period == 0 {
            return Err(EpochError::ZeroPeriod);
        }

        Ok(Self { start, period })
    }

    /// The start of epoch zero.
    pub const fn start(&self) -> UnixTimestamp {
        self.start
    }

    /// The length of an epoch in seconds.
    pub const fn period(&self) -> u64 {
        self.period
    }

    /// The epoch that contains `timestamp`, or `None` if it lies before epoch zero.
    pub const fn index_at(&self, timestamp: UnixTimestamp) -> Option<EpochIndex> {
        if timestamp < self.start {
            return None;
        }

        Some((timestamp - self.start) / self.period)
    }

    /// The latest epoch that has fully elapsed at `now`.
    pub fn last_completed(&self, now: UnixTimestamp) -> Option<EpochIndex> {
        self.index_at(now)?.checked_sub(1)
    }

    /// The time window covered by `index`.
    pub const fn window(&self, index: EpochIndex) -> EpochWindow {
        let start = self.start.saturating_add(index.saturating_mul(self.period));

        EpochWindow {
            index,
            start,
            end: start.saturating_add(self.period),
        }
    }
}

/// The half-open interval `[start, end)` of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpochWindow {
    /// The epoch index.
    pub index: EpochIndex,

    /// Inclusive start.
    pub start: UnixTimestamp,

    /// Exclusive end.
    pub end: UnixTimestamp,
}

impl EpochWindow {
    /// Whether `timestamp` falls in this window.
    pub const fn contains(&self, timestamp: UnixTimestamp) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}
