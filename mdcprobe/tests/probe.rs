use mdcledger::{Ledger, MediaKind, MediaSource, MediaUpload, MetadataResolver};
use mdcprobe::{LoftyResolver, upload_from_path};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Minimal PCM WAV file: mono, 16-bit, silent.
fn wav_bytes(seconds: u32, sample_rate: u32) -> Vec<u8> {
    let channels: u16 = 1;
    let bits: u16 = 16;
    let block_align = channels * bits / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = byte_rate * seconds;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

fn ebml_element(id: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.push(0x01);
    out.extend_from_slice(&(payload.len() as u64).to_be_bytes()[1..]);
    out.extend_from_slice(payload);
    out
}

/// WebM file whose segment Info declares `millis` of playback.
fn webm_bytes(millis: f64) -> Vec<u8> {
    let header = ebml_element(&[0x42, 0x82], b"webm");
    let mut info = ebml_element(&[0x2A, 0xD7, 0xB1], &1_000_000u32.to_be_bytes());
    info.extend(ebml_element(&[0x44, 0x89], &millis.to_be_bytes()));

    let mut segment = ebml_element(&[0x11, 0x4D, 0x9B, 0x74], &[0u8; 8]);
    segment.extend(ebml_element(&[0x15, 0x49, 0xA9, 0x66], &info));
    segment.extend(ebml_element(&[0x16, 0x54, 0xAE, 0x6B], &[0u8; 16]));

    let mut out = ebml_element(&[0x1A, 0x45, 0xDF, 0xA3], &header);
    out.extend(ebml_element(&[0x18, 0x53, 0x80, 0x67], &segment));
    out
}

fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_probe_wav_from_bytes() {
    let resolver = LoftyResolver::new();
    let source = MediaSource::Bytes(Arc::from(wav_bytes(2, 8_000)));

    let secs = resolver.resolve(&source).await.unwrap();

    assert!((secs - 2.0).abs() < 0.05, "got {secs}");
    assert_eq!(resolver.tracker().opened(), 1);
    assert_eq!(resolver.tracker().in_flight(), 0);
}

#[tokio::test]
async fn test_probe_wav_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "tone.wav", &wav_bytes(3, 8_000));
    let resolver = LoftyResolver::new();

    let secs = resolver.resolve(&MediaSource::Path(path)).await.unwrap();

    assert!((secs - 3.0).abs() < 0.05, "got {secs}");
    assert_eq!(resolver.tracker().released(), 1);
}

#[tokio::test]
async fn test_garbage_bytes_fail_and_release() {
    let resolver = LoftyResolver::new();
    let source = MediaSource::Bytes(Arc::from(&b"definitely not a media container"[..]));

    assert!(resolver.resolve(&source).await.is_err());
    assert_eq!(resolver.tracker().opened(), 1);
    assert_eq!(resolver.tracker().released(), 1);
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = LoftyResolver::new();
    let source = MediaSource::Path(dir.path().join("gone.mp3"));

    let err = resolver.resolve(&source).await.unwrap_err();

    assert!(matches!(err, mdcledger::ResolveError::Io(_)), "{err}");
    assert_eq!(resolver.tracker().opened(), 0);
}

#[tokio::test]
async fn test_ledger_batch_with_real_probe() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_fixture(&dir, "voice.wav", &wav_bytes(90, 8_000));
    let bad = write_fixture(&dir, "clip.mp4", b"not really an mp4");
    let resolver = LoftyResolver::new();
    let mut ledger = Ledger::new();

    ledger
        .ingest(
            vec![
                upload_from_path(&good),
                upload_from_path(&bad),
                MediaUpload::from_bytes("memo", None, wav_bytes(1, 8_000)),
            ],
            &resolver,
        )
        .await;

    let rows: Vec<_> = ledger
        .entries()
        .iter()
        .map(|e| (e.name.as_str(), e.kind, e.duration_secs))
        .collect();
    assert_eq!(
        rows,
        [
            ("voice.wav", MediaKind::Audio, 90),
            ("clip.mp4", MediaKind::Video, 0),
            ("memo", MediaKind::Video, 1),
        ]
    );
    assert_eq!(ledger.total_duration().to_string(), "1m 31s");
    assert_eq!(resolver.tracker().opened(), 3);
    assert_eq!(resolver.tracker().in_flight(), 0);
}

#[tokio::test]
async fn test_webm_duration_from_segment_info() {
    let dir = tempfile::tempdir().unwrap();
    let lecture = write_fixture(&dir, "lecture.webm", &webm_bytes(90_000.0));
    let resolver = LoftyResolver::new();
    let mut ledger = Ledger::new();

    ledger
        .ingest(
            vec![
                upload_from_path(&lecture),
                MediaUpload::from_bytes("short.mkv", Some("video/x-matroska"), webm_bytes(2_400.0)),
            ],
            &resolver,
        )
        .await;

    let rows: Vec<_> = ledger
        .entries()
        .iter()
        .map(|e| (e.name.as_str(), e.kind, e.duration_secs))
        .collect();
    assert_eq!(
        rows,
        [
            ("lecture.webm", MediaKind::Video, 90),
            ("short.mkv", MediaKind::Video, 2),
        ]
    );
    assert_eq!(ledger.total_charge().display(), "3.96");
    assert_eq!(resolver.tracker().opened(), 2);
    assert_eq!(resolver.tracker().in_flight(), 0);
}
