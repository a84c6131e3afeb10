//! Metadata resolver backed by `lofty`.
//!
//! [`LoftyResolver`] measures durations for the ledger, audio through
//! `lofty` and Matroska/WebM/AVI video through their container headers.
//! Every resolution holds one [`HandleTracker`]-counted handle on the
//! upload's bytes and gives it back when the probe finishes, successfully
//! or not.

mod container;
mod handle;
mod mime;
mod resolver;

pub use handle::HandleTracker;
pub use mime::{declared_type_for_path, upload_from_path};
pub use resolver::LoftyResolver;
