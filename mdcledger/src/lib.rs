//! Duration and charge ledger for uploaded media files.
//!
//! Files are ingested in batches: each file's duration is measured by a
//! [`MetadataResolver`], rounded to whole seconds and recorded as a
//! [`MediaEntry`]. The ledger sums the durations and multiplies the result by
//! a per-minute [`ChargeRate`].
//!
//! # Features
//!
//! - **Batch ingestion**: resolutions run concurrently, entries are appended
//!   together once the whole batch is done, in input order
//! - **Failure absorption**: an unreadable file still counts, as 0 seconds
//! - **Display helpers**: `Xm Ys` durations and two-decimal charges
//! - **Threshold banner**: an optional label when the charge goes over a limit
//!
//! The ledger is plain owned state; it lives for one session and is never
//! persisted.

mod banner;
mod charge;
mod duration;
mod entry;
mod error;
mod ledger;
mod resolver;
mod summary;
mod upload;

pub use banner::{DEFAULT_BANNER_LABEL, DEFAULT_BANNER_LIMIT, ThresholdBanner};
pub use charge::{Charge, ChargeRate, DEFAULT_RATE_PER_MINUTE, combine_minutes};
pub use duration::{DisplayDuration, format_duration, format_raw_seconds};
pub use entry::{EntryId, MediaEntry, MediaKind};
pub use error::ResolveError;
pub use ledger::Ledger;
pub use resolver::{MetadataResolver, settle_duration};
pub use summary::{EntryRow, LedgerSummary};
pub use upload::{MediaSource, MediaUpload};
