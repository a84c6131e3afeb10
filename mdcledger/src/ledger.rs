//! The session ledger: uploaded entries plus the current rate.

use crate::banner::ThresholdBanner;
use crate::charge::{Charge, ChargeRate};
use crate::duration::{DisplayDuration, format_duration};
use crate::entry::{EntryId, MediaEntry, MediaKind};
use crate::resolver::{MetadataResolver, resolve_bounded, settle_duration};
use crate::summary::LedgerSummary;
use crate::upload::MediaUpload;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info};

/// Ordered collection of [`MediaEntry`] values and the [`ChargeRate`] applied
/// to their total.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use mdcledger::{Ledger, MediaSource, MediaUpload, MetadataResolver, ResolveError};
///
/// struct Fixed(f64);
///
/// #[async_trait]
/// impl MetadataResolver for Fixed {
///     async fn resolve(&self, _source: &MediaSource) -> Result<f64, ResolveError> {
///         Ok(self.0)
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let mut ledger = Ledger::new();
/// let batch = vec![MediaUpload::from_bytes("take.mp3", Some("audio/mpeg"), vec![0u8; 4])];
/// ledger.ingest(batch, &Fixed(90.2)).await;
///
/// assert_eq!(ledger.total_duration().to_string(), "1m 30s");
/// assert_eq!(ledger.total_charge().display(), "3.90");
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<MediaEntry>,
    rate: ChargeRate,
    resolve_timeout: Option<Duration>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds each resolution; a resolution that overruns counts as failed.
    pub fn with_resolve_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout
    }

    /// Resolves every upload of the batch concurrently, then appends them all
    /// in input order.
    ///
    /// Nothing is appended before the whole batch has resolved. An upload
    /// whose duration cannot be resolved is still appended, with 0 seconds.
    /// Returns the identifiers of the new entries.
    pub async fn ingest(
        &mut self,
        batch: Vec<MediaUpload>,
        resolver: &dyn MetadataResolver,
    ) -> Vec<EntryId> {
        if batch.is_empty() {
            return Vec::new();
        }

        let bound = self.resolve_timeout;
        debug!(files = batch.len(), timeout = ?bound, "Resolving batch");

        let resolved = join_all(batch.into_iter().map(|upload| async move {
            let outcome = resolve_bounded(resolver, &upload.source, bound).await;
            let duration_secs = settle_duration(&upload.name, outcome);
            let kind = MediaKind::classify(upload.declared_type.as_deref());
            MediaEntry::new(upload.name, kind, duration_secs)
        }))
        .await;

        let ids: Vec<EntryId> = resolved.iter().map(|e| e.id).collect();
        for entry in &resolved {
            debug!(id = %entry.id, file = %entry.name, kind = %entry.kind, secs = entry.duration_secs, "Entry added");
        }
        self.entries.extend(resolved);
        info!(added = ids.len(), total = self.entries.len(), "Batch ingested");
        ids
    }

    /// Removes the entry with this identifier, if present.
    pub fn remove(&mut self, id: &EntryId) -> Option<MediaEntry> {
        let index = self.entries.iter().position(|e| &e.id == id)?;
        let removed = self.entries.remove(index);
        debug!(id = %removed.id, file = %removed.name, "Entry removed");
        Some(removed)
    }

    /// Removes by textual identifier. Malformed identifiers remove nothing.
    pub fn remove_str(&mut self, id: &str) -> Option<MediaEntry> {
        match id.parse::<EntryId>() {
            Ok(id) => self.remove(&id),
            Err(_) => {
                debug!(id, "Ignoring malformed entry id");
                None
            }
        }
    }

    /// Drops every entry. The rate is kept.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&MediaEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rate(&self) -> ChargeRate {
        self.rate
    }

    pub fn set_rate(&mut self, rate: ChargeRate) {
        self.rate = rate;
    }

    /// Sets the rate from raw user input; see [`ChargeRate::parse_input`].
    pub fn set_rate_input(&mut self, input: &str) -> ChargeRate {
        self.rate = ChargeRate::parse_input(input);
        debug!(input, rate = %self.rate, "Rate updated");
        self.rate
    }

    pub fn total_seconds(&self) -> u64 {
        self.entries.iter().map(|e| e.duration_secs).sum()
    }

    pub fn total_duration(&self) -> DisplayDuration {
        format_duration(self.total_seconds())
    }

    pub fn total_charge(&self) -> Charge {
        Charge::compute(self.total_duration(), self.rate)
    }

    /// Snapshot of everything a front end displays.
    pub fn summary(&self, banner: &ThresholdBanner) -> LedgerSummary {
        LedgerSummary::build(self, banner)
    }
}
