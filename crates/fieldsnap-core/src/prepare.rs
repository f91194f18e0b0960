//! Upload preparation with fallback to the original file.
//!
//! A failed decode or encode never costs the user their photo: the original
//! bytes are passed through untouched so the surrounding form submission can
//! still go ahead.

use log::{debug, warn};

use crate::capture::{from_file, sniff_mime};
use crate::compress::{BudgetStatus, CompressionTarget, Compressor};
use crate::encode::Encoder;
use crate::types::data_uri;
use crate::JPEG_MIME;

/// Bytes ready to hand to the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub payload: Vec<u8>,
    pub mime_type: &'static str,
    /// `false` when the original file is passed through.
    pub compressed: bool,
    /// Budget outcome; `None` when decoding or compression failed.
    pub status: Option<BudgetStatus>,
}

impl PreparedImage {
    pub fn size_bytes(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn to_data_uri(&self) -> String {
        data_uri(self.mime_type, &self.payload)
    }

    fn original(bytes: &[u8]) -> Self {
        Self {
            payload: bytes.to_vec(),
            mime_type: sniff_mime(bytes),
            compressed: false,
            status: None,
        }
    }
}

/// Decode `bytes`, compress towards `target`, or fall back to `bytes` as-is.
///
/// A JPEG that already fits the byte budget and the dimension cap is kept
/// when re-encoding would not make it smaller.
pub fn prepare_upload<E: Encoder>(
    bytes: &[u8],
    target: &CompressionTarget,
    compressor: &Compressor<E>,
) -> PreparedImage {
    let raw = match from_file(bytes) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("using original upload, decode failed: {}", e);
            return PreparedImage::original(bytes);
        }
    };

    let compression = match compressor.compress(&raw, target) {
        Ok(compression) => compression,
        Err(e) => {
            warn!("using original upload, compression failed: {}", e);
            return PreparedImage::original(bytes);
        }
    };

    let target = target.normalized();
    let original_fits = sniff_mime(bytes) == JPEG_MIME
        && bytes.len() as u64 <= target.max_size_bytes
        && raw.longest_edge() <= target.max_dimension;
    if original_fits && bytes.len() as u64 <= compression.image.size_bytes() {
        debug!(
            "keeping original upload, {} bytes already within budget",
            bytes.len()
        );
        return PreparedImage {
            status: Some(BudgetStatus::Met),
            ..PreparedImage::original(bytes)
        };
    }

    PreparedImage {
        status: Some(compression.status),
        payload: compression.into_image().into_payload(),
        mime_type: JPEG_MIME,
        compressed: true,
    }
}
