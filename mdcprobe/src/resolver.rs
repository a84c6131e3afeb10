//! Duration probing with `lofty`.

use crate::container::Container;
use crate::handle::{HandleTracker, SourceHandle};
use async_trait::async_trait;
use lofty::config::ParseOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use mdcledger::{MediaSource, MetadataResolver, ResolveError};
use std::sync::Arc;
use tracing::debug;

/// Reads durations from container metadata.
///
/// The file type is sniffed from the content, never from the name. Matroska,
/// WebM and AVI headers are read directly, everything else goes through
/// `lofty`. Probing runs on the blocking pool.
///
/// # Exemple
///
/// ```rust,no_run
/// use mdcledger::Ledger;
/// use mdcprobe::{LoftyResolver, upload_from_path};
/// use std::path::Path;
///
/// # async fn run() {
/// let resolver = LoftyResolver::new();
/// let mut ledger = Ledger::new();
/// ledger
///     .ingest(vec![upload_from_path(Path::new("track.flac"))], &resolver)
///     .await;
/// println!("{}", ledger.total_duration());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoftyResolver {
    tracker: Arc<HandleTracker>,
}

impl LoftyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self) -> &HandleTracker {
        &self.tracker
    }
}

#[async_trait]
impl MetadataResolver for LoftyResolver {
    async fn resolve(&self, source: &MediaSource) -> Result<f64, ResolveError> {
        let tracker = Arc::clone(&self.tracker);
        let source = source.clone();

        tokio::task::spawn_blocking(move || {
            let handle = SourceHandle::open(&source, tracker)?;
            probe_duration(handle)
        })
        .await
        .map_err(|e| ResolveError::Probe(format!("probe task failed: {e}")))?
    }
}

fn probe_duration(mut handle: SourceHandle) -> Result<f64, ResolveError> {
    if let Some(container) = Container::sniff(&mut handle)? {
        let secs = container.duration(&mut handle)?;
        debug!(?container, secs, "Read container duration");
        return Ok(secs);
    }

    let tagged_file = Probe::new(&mut handle)
        .guess_file_type()?
        .options(ParseOptions::new())
        .read()
        .map_err(|e| ResolveError::Probe(e.to_string()))?;

    let duration = tagged_file.properties().duration();
    debug!(file_type = ?tagged_file.file_type(), secs = duration.as_secs_f64(), "Probed duration");
    Ok(duration.as_secs_f64())
}
