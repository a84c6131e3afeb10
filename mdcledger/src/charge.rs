//! Per-minute rate and total charge.
//!
//! The charge multiplies the rate by the *combined decimal* of the total
//! duration: minutes and zero-padded seconds glued around a decimal point.
//! `1m 30s` combines to `1.30`, not `1.5`. That arithmetic is kept as-is
//! pending a product decision; see `DESIGN.md`.

use crate::duration::DisplayDuration;
use std::fmt;

pub const DEFAULT_RATE_PER_MINUTE: f64 = 3.0;

/// Monetary units charged per minute. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ChargeRate(f64);

impl ChargeRate {
    /// Builds a rate, clamping negative or non-finite values to zero.
    pub fn new(per_minute: f64) -> Self {
        if per_minute.is_finite() && per_minute > 0.0 {
            Self(per_minute)
        } else {
            Self(0.0)
        }
    }

    /// Parses free-form user input the way a numeric form field does.
    ///
    /// The longest leading number is used (`"2.5 usd"` is 2.5); input with
    /// no leading number is 0.
    ///
    /// ```
    /// use mdcledger::ChargeRate;
    ///
    /// assert_eq!(ChargeRate::parse_input("4.5").per_minute(), 4.5);
    /// assert_eq!(ChargeRate::parse_input("abc").per_minute(), 0.0);
    /// assert_eq!(ChargeRate::parse_input("").per_minute(), 0.0);
    /// ```
    pub fn parse_input(input: &str) -> Self {
        leading_number(input).map(Self::new).unwrap_or(Self(0.0))
    }

    pub fn per_minute(&self) -> f64 {
        self.0
    }
}

impl Default for ChargeRate {
    fn default() -> Self {
        Self(DEFAULT_RATE_PER_MINUTE)
    }
}

impl fmt::Display for ChargeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let digits_at = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    end = digits_at(end);
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_at(end + 1);
        let frac_digits = frac_end - (end + 1);
        if mantissa_digits + frac_digits > 0 {
            end = frac_end;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_at(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Glues minutes and two-digit seconds into one decimal number.
///
/// ```
/// use mdcledger::{DisplayDuration, combine_minutes};
///
/// assert_eq!(combine_minutes(DisplayDuration::new(1, 30)), 1.30);
/// assert_eq!(combine_minutes(DisplayDuration::new(2, 5)), 2.05);
/// ```
pub fn combine_minutes(duration: DisplayDuration) -> f64 {
    format!("{}.{:02}", duration.minutes, duration.seconds)
        .parse()
        .unwrap_or(duration.minutes as f64)
}

/// A computed charge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Charge {
    amount: f64,
}

impl Charge {
    pub fn compute(total: DisplayDuration, rate: ChargeRate) -> Self {
        Self {
            amount: combine_minutes(total) * rate.per_minute(),
        }
    }

    /// Unrounded amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Amount with exactly two decimals.
    pub fn display(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// The two-decimal amount read back as a number.
    pub fn rounded(&self) -> f64 {
        self.display().parse().unwrap_or(self.amount)
    }
}

impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.amount)
    }
}
