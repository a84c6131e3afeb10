//! Ledger entries: one record per ingested file.

use crate::duration::{DisplayDuration, format_duration};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of a [`MediaEntry`], unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Coarse media classification used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Classifies a declared media type.
    ///
    /// A type is audio iff it contains the substring `"audio"`. Everything
    /// else, including a missing or empty type, is video. The file name is
    /// never consulted.
    ///
    /// ```
    /// use mdcledger::MediaKind;
    ///
    /// assert_eq!(MediaKind::classify(Some("audio/mpeg")), MediaKind::Audio);
    /// assert_eq!(MediaKind::classify(Some("video/mp4")), MediaKind::Video);
    /// assert_eq!(MediaKind::classify(None), MediaKind::Video);
    /// ```
    pub fn classify(declared_type: Option<&str>) -> Self {
        match declared_type {
            Some(t) if t.contains("audio") => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded file with its resolved duration.
///
/// `duration_secs` is rounded once, when the entry is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaEntry {
    pub id: EntryId,
    pub name: String,
    pub kind: MediaKind,
    pub duration_secs: u64,
}

impl MediaEntry {
    pub fn new(name: impl Into<String>, kind: MediaKind, duration_secs: u64) -> Self {
        Self {
            id: EntryId::generate(),
            name: name.into(),
            kind,
            duration_secs,
        }
    }

    /// Per-row display duration.
    pub fn display_duration(&self) -> DisplayDuration {
        format_duration(self.duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_audio() {
        assert_eq!(MediaKind::classify(Some("audio/mpeg")), MediaKind::Audio);
        assert_eq!(MediaKind::classify(Some("audio/x-wav")), MediaKind::Audio);
    }

    #[test]
    fn test_classify_defaults_to_video() {
        assert_eq!(MediaKind::classify(Some("video/mp4")), MediaKind::Video);
        assert_eq!(MediaKind::classify(Some("")), MediaKind::Video);
        assert_eq!(MediaKind::classify(None), MediaKind::Video);
        assert_eq!(
            MediaKind::classify(Some("application/octet-stream")),
            MediaKind::Video
        );
    }

    #[test]
    fn test_classify_is_substring_match() {
        // Anything mentioning "audio" counts, wherever it appears.
        assert_eq!(
            MediaKind::classify(Some("application/x-audio-bundle")),
            MediaKind::Audio
        );
        // Case-sensitive, like the declared type itself.
        assert_eq!(MediaKind::classify(Some("AUDIO/MPEG")), MediaKind::Video);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = MediaEntry::new("a.mp3", MediaKind::Audio, 10);
        let b = MediaEntry::new("a.mp3", MediaKind::Audio, 10);
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_id_round_trips_through_text() {
        let id = EntryId::generate();
        let parsed: EntryId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_display_duration() {
        let entry = MediaEntry::new("clip.mp4", MediaKind::Video, 125);
        assert_eq!(entry.display_duration(), DisplayDuration::new(2, 5));
    }

    #[test]
    fn test_serialize_kind_lowercase() {
        let entry = MediaEntry::new("song.flac", MediaKind::Audio, 3);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["duration_secs"], 3);
        assert_eq!(json["id"], entry.id.to_string());
    }
}
