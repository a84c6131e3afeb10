//! Errors reported by metadata resolvers.

use std::time::Duration;

/// Why a resolver could not report a duration.
///
/// The ledger never propagates these: a failed resolution is recorded as a
/// zero-second entry and logged.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The byte source could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container was read but carried no usable duration.
    #[error("probe failed: {0}")]
    Probe(String),

    /// The resolver did not answer within the configured bound.
    #[error("resolution timed out after {0:?}")]
    TimedOut(Duration),

    /// The resolver does not handle this kind of source.
    #[error("unsupported source: {0}")]
    Unsupported(String),
}

impl ResolveError {
    /// Returns `true` when the failure came from the source itself rather
    /// than from the resolver giving up.
    pub fn is_source_error(&self) -> bool {
        matches!(self, ResolveError::Io(_) | ResolveError::Probe(_))
    }
}
