//! Gzip body codec.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::http::error::ProxyError;

/// Content encodings a body can be rewritten under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Identity,
    Gzip,
}

impl BodyEncoding {
    /// Classify a `Content-Encoding` value. `None` means an encoding the
    /// proxy cannot decode (br, deflate, stacked encodings, ...).
    pub fn from_header(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("identity") => Some(BodyEncoding::Identity),
            Some("gzip") | Some("x-gzip") => Some(BodyEncoding::Gzip),
            Some(_) => None,
        }
    }
}

/// Decompress a full gzip body, refusing to produce more than `limit` bytes.
pub fn gunzip(bytes: &[u8], limit: usize) -> Result<Vec<u8>, ProxyError> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(ProxyError::Decode)?;

    if out.len() > limit {
        return Err(ProxyError::BodyTooLarge { limit });
    }
    Ok(out)
}

/// Compress a full body with gzip.
pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>, ProxyError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
    encoder.write_all(bytes).map_err(ProxyError::Encode)?;
    encoder.finish().map_err(ProxyError::Encode)
}
