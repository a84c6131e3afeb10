//! Scoped access to an upload's bytes.
//!
//! A [`SourceHandle`] is opened for exactly one resolution and released when
//! it is dropped, whatever way the probe ends.

use mdcledger::MediaSource;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Counts acquired and released handles.
#[derive(Debug, Default)]
pub struct HandleTracker {
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl HandleTracker {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Handles currently held by a running probe.
    pub fn in_flight(&self) -> usize {
        self.opened().saturating_sub(self.released())
    }
}

enum HandleReader {
    File(BufReader<File>),
    Memory(Cursor<Arc<[u8]>>),
}

pub(crate) struct SourceHandle {
    reader: HandleReader,
    label: String,
    tracker: Arc<HandleTracker>,
}

impl SourceHandle {
    pub(crate) fn open(source: &MediaSource, tracker: Arc<HandleTracker>) -> io::Result<Self> {
        let (reader, label) = match source {
            MediaSource::Path(path) => (
                HandleReader::File(BufReader::new(File::open(path)?)),
                path.display().to_string(),
            ),
            MediaSource::Bytes(bytes) => (
                HandleReader::Memory(Cursor::new(Arc::clone(bytes))),
                format!("<{} bytes>", bytes.len()),
            ),
        };
        tracker.opened.fetch_add(1, Ordering::SeqCst);
        trace!(source = %label, "Source handle acquired");
        Ok(Self {
            reader,
            label,
            tracker,
        })
    }
}

impl Read for SourceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.reader {
            HandleReader::File(r) => r.read(buf),
            HandleReader::Memory(r) => r.read(buf),
        }
    }
}

impl Seek for SourceHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.reader {
            HandleReader::File(r) => r.seek(pos),
            HandleReader::Memory(r) => r.seek(pos),
        }
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.tracker.released.fetch_add(1, Ordering::SeqCst);
        trace!(source = %self.label, "Source handle released");
    }
}
