//! fieldsnap core - photo capture and compression pipeline
//!
//! This crate turns camera frames and gallery files into upload-ready JPEGs
//! that fit a byte budget:
//!
//! ```text
//! capture (camera / file) -> RawImage -> compress (loop: encode -> measure) -> EncodedImage
//! ```
//!
//! The crate holds no global state. Every call works on its own inputs, so
//! independent flows (camera capture, gallery upload) can run side by side.

pub mod capture;
pub mod compress;
pub mod encode;
pub mod prepare;
mod types;

#[cfg(test)]
mod test_helpers;

pub use capture::{CameraSession, CaptureError, Facing, ResolutionHint, StreamHandle};
pub use compress::{BudgetStatus, Compression, CompressionTarget, Compressor};
pub use encode::{EncodeError, Encoder, JpegEncoder};
pub use prepare::{prepare_upload, PreparedImage};
pub use types::{EncodedImage, EncodingParameters, Quality, RawImage, JPEG_MIME, MIN_QUALITY};

/// Default compressor: bilinear resize and `image`-crate JPEG encoding.
pub fn default_compressor() -> Compressor<JpegEncoder> {
    Compressor::new(JpegEncoder::default())
}
