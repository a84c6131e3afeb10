//! Serializable snapshot of a ledger for text and JSON front ends.

use crate::banner::ThresholdBanner;
use crate::duration::DisplayDuration;
use crate::entry::{EntryId, MediaKind};
use crate::ledger::Ledger;
use serde::Serialize;

/// One displayed row of the uploaded-files list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRow {
    pub id: EntryId,
    pub name: String,
    pub kind: MediaKind,
    pub duration_secs: u64,
    pub duration: DisplayDuration,
}

/// Read-only snapshot of a ledger, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub file_count: usize,
    pub entries: Vec<EntryRow>,
    pub total_secs: u64,
    pub total_duration: DisplayDuration,
    pub rate_per_minute: f64,
    pub total_charge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl LedgerSummary {
    pub(crate) fn build(ledger: &Ledger, banner: &ThresholdBanner) -> Self {
        let charge = ledger.total_charge();
        let entries = ledger
            .entries()
            .iter()
            .map(|e| EntryRow {
                id: e.id,
                name: e.name.clone(),
                kind: e.kind,
                duration_secs: e.duration_secs,
                duration: e.display_duration(),
            })
            .collect();

        Self {
            file_count: ledger.len(),
            entries,
            total_secs: ledger.total_seconds(),
            total_duration: ledger.total_duration(),
            rate_per_minute: ledger.rate().per_minute(),
            total_charge: charge.display(),
            banner: banner.label_for(&charge).map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_count == 0
    }
}
