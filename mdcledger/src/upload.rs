//! Raw inputs handed to [`Ledger::ingest`](crate::Ledger::ingest).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the bytes of an upload live.
#[derive(Clone)]
pub enum MediaSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
            MediaSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
        }
    }
}

/// A file-like input: a display name, the declared media type and its bytes.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub name: String,
    pub declared_type: Option<String>,
    pub source: MediaSource,
}

impl MediaUpload {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>, source: MediaSource) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
            source,
        }
    }

    pub fn from_bytes(
        name: impl Into<String>,
        declared_type: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self::new(name, declared_type, MediaSource::Bytes(bytes.into()))
    }
}
