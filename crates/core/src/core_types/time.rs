//! Simulated time units
//!
//! Simulation time is measured in minutes from the start of the run.

/// Minutes in one hour
pub const HOUR_IN_MINUTES: f64 = 60.0;

/// Minutes in one day
pub const DAY_IN_MINUTES: f64 = 1440.0;

/// Minutes in one (365 day) year
pub const YEAR_IN_MINUTES: f64 = 525_600.0;

/// Whole simulated days elapsed at `time`
#[inline]
pub fn days(time: f64) -> u32 {
    (time / DAY_IN_MINUTES).floor() as u32
}

/// Whole simulated years elapsed at `time`
#[inline]
pub fn years(time: f64) -> u32 {
    (time / YEAR_IN_MINUTES).floor() as u32
}

/// Fractional simulated years elapsed at `time`
#[inline]
pub fn years_f64(time: f64) -> f64 {
    time / YEAR_IN_MINUTES
}
