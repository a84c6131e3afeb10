//! The duration-resolution seam.

use crate::error::ResolveError;
use crate::upload::MediaSource;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Measures the duration of a media source.
///
/// Implementations report seconds as a real number. They must not touch the
/// ledger; the ledger alone decides what a failure is worth.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, source: &MediaSource) -> Result<f64, ResolveError>;
}

/// Converts a resolver answer into whole seconds.
///
/// Failures, non-finite and negative values all become 0.
pub fn settle_duration(name: &str, outcome: Result<f64, ResolveError>) -> u64 {
    match outcome {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => secs.round() as u64,
        Ok(secs) => {
            warn!(file = %name, reported = secs, "Unusable duration, counting 0s");
            0
        }
        Err(e) => {
            warn!(file = %name, error = %e, "Duration resolution failed, counting 0s");
            0
        }
    }
}

/// Runs one resolution, optionally bounded.
pub(crate) async fn resolve_bounded(
    resolver: &dyn MetadataResolver,
    source: &MediaSource,
    bound: Option<Duration>,
) -> Result<f64, ResolveError> {
    match bound {
        Some(limit) => tokio::time::timeout(limit, resolver.resolve(source))
            .await
            .unwrap_or(Err(ResolveError::TimedOut(limit))),
        None => resolver.resolve(source).await,
    }
}
