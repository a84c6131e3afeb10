//! Summary heading label shown when the charge runs high.
//!
//! Kept apart from the charge arithmetic: it only reads a computed [`Charge`].

use crate::charge::Charge;

pub const DEFAULT_BANNER_LIMIT: f64 = 150.0;
pub const DEFAULT_BANNER_LABEL: &str = "PALDO BAKA NAMAN";

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBanner {
    pub enabled: bool,
    pub limit: f64,
    pub label: String,
}

impl ThresholdBanner {
    pub fn new(limit: f64, label: impl Into<String>) -> Self {
        Self {
            enabled: true,
            limit,
            label: label.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns the label when the two-decimal charge is strictly above the limit.
    pub fn label_for(&self, charge: &Charge) -> Option<&str> {
        (self.enabled && charge.rounded() > self.limit).then_some(self.label.as_str())
    }
}

impl Default for ThresholdBanner {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_LIMIT, DEFAULT_BANNER_LABEL)
    }
}
