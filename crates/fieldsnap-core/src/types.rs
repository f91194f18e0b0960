//! Core value types shared by the capture, encode and compress stages.
//!
//! Every type here is an immutable value scoped to one pipeline call. Stages
//! borrow a [`RawImage`] and produce new [`EncodedImage`]s; nothing is
//! modified in place.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// MIME type of every artifact produced by the encoder.
pub const JPEG_MIME: &str = "image/jpeg";

/// Lowest quality value a [`Quality`] can hold. Keeps quality strictly above zero.
pub const MIN_QUALITY: f32 = 0.01;

/// A decoded, uncompressed image with RGB pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// Create a new RawImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a RawImage from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Create a RawImage from RGBA bytes (as read back from a canvas), dropping alpha.
    ///
    /// Trailing bytes that do not form a full pixel are ignored.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let pixels = rgba
            .chunks_exact(4)
            .take(width as usize * height as usize)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Length of the longer edge in pixels.
    pub fn longest_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Lossy encoding quality in `(0.0, 1.0]`. Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(1.0);
        }
        Self(value.clamp(MIN_QUALITY, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Map onto the JPEG encoder's 1-100 scale.
    pub fn to_jpeg_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// The `(max_dimension, quality)` pair controlling one encode attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingParameters {
    /// Longest-edge cap in pixels. Always at least 1.
    pub max_dimension: u32,
    pub quality: Quality,
}

impl EncodingParameters {
    pub fn new(max_dimension: u32, quality: f32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            quality: Quality::new(quality),
        }
    }
}

/// A lossy-compressed JPEG artifact.
///
/// The byte size is always measured from the payload, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    payload: Vec<u8>,
    /// Output width after resizing.
    pub width: u32,
    /// Output height after resizing.
    pub height: u32,
}

impl EncodedImage {
    pub fn new(payload: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            payload,
            width,
            height,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn size_bytes(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME
    }

    /// Render as a `data:image/jpeg;base64,...` URI.
    pub fn to_data_uri(&self) -> String {
        data_uri(JPEG_MIME, &self.payload)
    }
}

pub(crate) fn data_uri(mime_type: &str, payload: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(payload))
}
