//! Declared media types for files picked from disk.

use mdcledger::{MediaSource, MediaUpload};
use std::path::Path;

/// Guesses the media type a file picker would declare for this path.
pub fn declared_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "aif" | "aiff" => "audio/aiff",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

/// Builds an upload for a file on disk, named after its file name.
pub fn upload_from_path(path: &Path) -> MediaUpload {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    MediaUpload::new(
        name,
        declared_type_for_path(path),
        MediaSource::Path(path.to_path_buf()),
    )
}
