//! Minute/second display of durations.

use serde::Serialize;
use std::fmt;

/// A duration split for display as `{minutes}m {seconds}s`.
///
/// `seconds` is always below 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DisplayDuration {
    pub minutes: u64,
    pub seconds: u64,
}

impl DisplayDuration {
    /// Builds a display pair, carrying whole minutes out of `seconds`.
    ///
    /// ```
    /// use mdcledger::DisplayDuration;
    ///
    /// assert_eq!(DisplayDuration::new(4, 60), DisplayDuration::new(5, 0));
    /// ```
    pub fn new(minutes: u64, seconds: u64) -> Self {
        Self {
            minutes: minutes + seconds / 60,
            seconds: seconds % 60,
        }
    }
}

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m {}s", self.minutes, self.seconds)
    }
}

/// Formats a whole number of seconds.
pub fn format_duration(total_secs: u64) -> DisplayDuration {
    DisplayDuration::new(total_secs / 60, total_secs % 60)
}

/// Formats a raw, possibly fractional, number of seconds.
///
/// Minutes are floored and the remainder rounded, so a remainder of 59.5 or
/// more rolls over into the next minute. Negative or non-finite input
/// formats as zero.
pub fn format_raw_seconds(total_secs: f64) -> DisplayDuration {
    if !total_secs.is_finite() || total_secs <= 0.0 {
        return DisplayDuration::default();
    }
    let minutes = (total_secs / 60.0).floor() as u64;
    let seconds = (total_secs % 60.0).round() as u64;
    DisplayDuration::new(minutes, seconds)
}
