//! Session start pacing
//!
//! The gateway allows `max_concurrency` sessions to start per rate-limit window. Starts are
//! spread evenly across the window and rounded to whole time units.

use std::time::Duration;

/// Pacing interval in whole units
///
/// `max_concurrency` of zero is treated as one. The result never drops below one unit.
#[must_use]
pub fn interval_units(window_units: u64, max_concurrency: u32) -> u64 {
    round_units(window_units as f64, max_concurrency)
}

fn round_units(window_units: f64, max_concurrency: u32) -> u64 {
    let concurrency = f64::from(max_concurrency.max(1));
    ((window_units / concurrency).round() as u64).max(1)
}

/// Converts a rate-limit window into the delay between session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalCalculator {
    unit: Duration,
}

impl IntervalCalculator {
    /// One second, the granularity the gateway's rate limit is expressed in
    pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

    #[must_use]
    pub const fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Delay between two consecutive session starts
    ///
    /// The share of the window each start gets is rounded once to the nearest unit, and never
    /// drops below one unit.
    #[must_use]
    pub fn interval(&self, window: Duration, max_concurrency: u32) -> Duration {
        let unit = self.unit.max(Duration::from_nanos(1));
        let units = round_units(window.as_secs_f64() / unit.as_secs_f64(), max_concurrency);
        unit * u32::try_from(units).unwrap_or(u32::MAX)
    }
}

impl Default for IntervalCalculator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_UNIT)
    }
}
