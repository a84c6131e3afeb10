//! Duration headers of video containers `lofty` does not read.
//!
//! Matroska/WebM carry the duration in the segment `Info` element, AVI in the
//! main `avih` header. Both are read straight from the handle without
//! touching any frame data.

use mdcledger::ResolveError;
use std::io::{self, Read, Seek, SeekFrom};

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

const ID_EBML: u64 = 0x1A45_DFA3;
const ID_SEGMENT: u64 = 0x1853_8067;
const ID_INFO: u64 = 0x1549_A966;
const ID_CLUSTER: u64 = 0x1F43_B675;
const ID_TIMESTAMP_SCALE: u64 = 0x2A_D7B1;
const ID_DURATION: u64 = 0x4489;

/// Nanoseconds per tick when `TimestampScale` is absent.
const DEFAULT_TIMESTAMP_SCALE: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Matroska,
    Avi,
}

impl Container {
    /// Recognizes a container from its first bytes and rewinds the reader.
    pub(crate) fn sniff<R: Read + Seek>(reader: &mut R) -> io::Result<Option<Self>> {
        let mut head = Vec::with_capacity(12);
        reader.by_ref().take(12).read_to_end(&mut head)?;
        reader.seek(SeekFrom::Start(0))?;

        let container = if head.starts_with(&EBML_MAGIC) {
            Some(Container::Matroska)
        } else if head.len() == 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"AVI " {
            Some(Container::Avi)
        } else {
            None
        };
        Ok(container)
    }

    pub(crate) fn duration<R: Read + Seek>(self, reader: &mut R) -> Result<f64, ResolveError> {
        match self {
            Container::Matroska => matroska_duration(reader),
            Container::Avi => avi_duration(reader),
        }
    }
}

fn probe_error(what: &str) -> ResolveError {
    ResolveError::Probe(what.to_string())
}

/// Reads an EBML variable-length integer. Element ids keep their length
/// marker, sizes drop it. `None` is the reserved "unknown size" value.
fn read_vint<R: Read>(reader: &mut R, keep_marker: bool) -> Result<Option<u64>, ResolveError> {
    let mut first = [0u8; 1];
    reader.read_exact(&mut first)?;
    let len = first[0].leading_zeros() as usize + 1;
    if len > 8 {
        return Err(probe_error("invalid EBML variable-length integer"));
    }

    let marker = 0x80u8 >> (len - 1);
    let data_mask = marker - 1;
    let mut value = if keep_marker {
        u64::from(first[0])
    } else {
        u64::from(first[0] & data_mask)
    };
    let mut all_ones = first[0] & data_mask == data_mask;

    let mut rest = [0u8; 7];
    reader.read_exact(&mut rest[..len - 1])?;
    for &byte in &rest[..len - 1] {
        value = (value << 8) | u64::from(byte);
        all_ones &= byte == 0xFF;
    }

    if !keep_marker && all_ones {
        return Ok(None);
    }
    Ok(Some(value))
}

fn read_element_header<R: Read>(reader: &mut R) -> Result<(u64, Option<u64>), ResolveError> {
    let id = read_vint(reader, true)?.ok_or_else(|| probe_error("invalid EBML element id"))?;
    let size = read_vint(reader, false)?;
    Ok((id, size))
}

fn read_payload<R: Read>(reader: &mut R, size: u64) -> Result<Vec<u8>, ResolveError> {
    if size > 8 {
        return Err(probe_error("oversized EBML number"));
    }
    let mut buf = vec![0u8; size as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_uint<R: Read>(reader: &mut R, size: u64) -> Result<u64, ResolveError> {
    Ok(read_payload(reader, size)?
        .into_iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(b)))
}

fn read_float<R: Read>(reader: &mut R, size: u64) -> Result<f64, ResolveError> {
    let bytes = read_payload(reader, size)?;
    match bytes.len() {
        0 => Ok(0.0),
        4 => Ok(f64::from(f32::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
        ]))),
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes);
            Ok(f64::from_be_bytes(raw))
        }
        _ => Err(probe_error("invalid EBML float size")),
    }
}

fn skip<R: Seek>(reader: &mut R, size: Option<u64>) -> Result<(), ResolveError> {
    let size = size.ok_or_else(|| probe_error("unknown-size element cannot be skipped"))?;
    let offset = i64::try_from(size).map_err(|_| probe_error("element size out of range"))?;
    reader.seek(SeekFrom::Current(offset))?;
    Ok(())
}

fn matroska_duration<R: Read + Seek>(reader: &mut R) -> Result<f64, ResolveError> {
    let (id, size) = read_element_header(reader)?;
    if id != ID_EBML {
        return Err(probe_error("missing EBML header"));
    }
    skip(reader, size)?;

    loop {
        let (id, size) = read_element_header(reader)?;
        if id == ID_SEGMENT {
            return segment_duration(reader, size);
        }
        skip(reader, size)?;
    }
}

fn segment_duration<R: Read + Seek>(reader: &mut R, size: Option<u64>) -> Result<f64, ResolveError> {
    let start = reader.stream_position()?;
    let end = size.map_or(u64::MAX, |s| start.saturating_add(s));

    while reader.stream_position()? < end {
        let (id, size) = match read_element_header(reader) {
            Ok(header) => header,
            Err(ResolveError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        };
        match id {
            ID_INFO => return info_duration(reader, size),
            ID_CLUSTER => break,
            _ => skip(reader, size)?,
        }
    }
    Err(probe_error("Matroska segment carries no duration"))
}

fn info_duration<R: Read + Seek>(reader: &mut R, size: Option<u64>) -> Result<f64, ResolveError> {
    let size = size.ok_or_else(|| probe_error("unknown-size Info element"))?;
    let end = reader.stream_position()?.saturating_add(size);

    let mut scale = DEFAULT_TIMESTAMP_SCALE;
    let mut ticks = None;
    while reader.stream_position()? < end {
        let (id, size) = read_element_header(reader)?;
        let size = size.ok_or_else(|| probe_error("unknown-size Info child"))?;
        match id {
            ID_TIMESTAMP_SCALE => scale = read_uint(reader, size)?,
            ID_DURATION => ticks = Some(read_float(reader, size)?),
            _ => skip(reader, Some(size))?,
        }
    }

    let ticks = ticks.ok_or_else(|| probe_error("Matroska Info has no Duration"))?;
    Ok(ticks * scale as f64 / 1e9)
}

fn read_fourcc<R: Read>(reader: &mut R) -> io::Result<[u8; 4]> {
    let mut fourcc = [0u8; 4];
    reader.read_exact(&mut fourcc)?;
    Ok(fourcc)
}

fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_fourcc(reader)?))
}

fn avi_duration<R: Read + Seek>(reader: &mut R) -> Result<f64, ResolveError> {
    reader.seek(SeekFrom::Start(12))?;

    loop {
        let fourcc = read_fourcc(reader)?;
        let size = read_u32_le(reader)?;
        let padded = u64::from(size) + u64::from(size & 1);

        match &fourcc {
            b"LIST" => {
                // Descend into the header list, whose first chunk is `avih`.
                if &read_fourcc(reader)? != b"hdrl" {
                    skip(reader, Some(padded.saturating_sub(4)))?;
                }
            }
            b"avih" => {
                if size < 20 {
                    return Err(probe_error("truncated AVI main header"));
                }
                let micros_per_frame = read_u32_le(reader)?;
                reader.seek(SeekFrom::Current(12))?;
                let total_frames = read_u32_le(reader)?;
                return Ok(f64::from(micros_per_frame) * f64::from(total_frames) / 1e6);
            }
            _ => skip(reader, Some(padded))?,
        }
    }
}
