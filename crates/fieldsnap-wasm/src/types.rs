//! WASM-compatible wrapper types for images.
//!
//! This module provides JavaScript-friendly types that wrap the core fieldsnap
//! types, handling the conversion between Rust and JavaScript data representations.

use fieldsnap_core::{Compression, PreparedImage, RawImage};
use wasm_bindgen::prelude::*;

/// A raw (decoded, uncompressed) image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`. The `free()` method can be called to
/// release WASM memory early; wasm-bindgen's finalizer handles it otherwise.
#[wasm_bindgen]
pub struct JsRawImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRawImage {
    /// Create a new JsRawImage from dimensions and RGB pixel data
    /// (3 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRawImage {
        JsRawImage {
            width,
            height,
            pixels,
        }
    }

    /// Create a JsRawImage from canvas `ImageData` bytes (RGBA).
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> JsRawImage {
        Self::from_raw(RawImage::from_rgba(width, height, rgba))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3 for RGB)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsRawImage {
    pub(crate) fn from_raw(img: RawImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Borrow as a core RawImage. Clones the pixel data.
    pub(crate) fn to_raw(&self) -> RawImage {
        RawImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Result of compressing a raw image.
#[wasm_bindgen]
pub struct JsEncodedImage {
    payload: Vec<u8>,
    width: u32,
    height: u32,
    attempts: u32,
    met_target: bool,
}

#[wasm_bindgen]
impl JsEncodedImage {
    /// `data:image/jpeg;base64,...` form of the payload.
    #[wasm_bindgen(getter)]
    pub fn data_uri(&self) -> String {
        fieldsnap_core::EncodedImage::new(self.payload.clone(), self.width, self.height)
            .to_data_uri()
    }

    /// Encoded size, measured from the payload.
    #[wasm_bindgen(getter)]
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        fieldsnap_core::JPEG_MIME.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of encoder calls the search used.
    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// `false` when the byte budget could not be reached.
    #[wasm_bindgen(getter)]
    pub fn met_target(&self) -> bool {
        self.met_target
    }

    /// The JPEG bytes as a Uint8Array (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.payload.clone()
    }
}

impl From<Compression> for JsEncodedImage {
    fn from(compression: Compression) -> Self {
        let attempts = compression.encode_calls() as u32;
        let met_target = compression.met_target();
        let image = compression.into_image();
        Self {
            width: image.width,
            height: image.height,
            payload: image.into_payload(),
            attempts,
            met_target,
        }
    }
}

/// Upload-ready file: compressed JPEG, or the original when compression failed.
#[wasm_bindgen]
pub struct JsPreparedImage {
    inner: PreparedImage,
}

#[wasm_bindgen]
impl JsPreparedImage {
    #[wasm_bindgen(getter)]
    pub fn data_uri(&self) -> String {
        self.inner.to_data_uri()
    }

    #[wasm_bindgen(getter)]
    pub fn size_bytes(&self) -> usize {
        self.inner.payload.len()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.to_string()
    }

    /// `false` when the original file is passed through unchanged.
    #[wasm_bindgen(getter)]
    pub fn compressed(&self) -> bool {
        self.inner.compressed
    }

    #[wasm_bindgen(getter)]
    pub fn met_target(&self) -> bool {
        self.inner.status == Some(fieldsnap_core::BudgetStatus::Met)
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.inner.payload.clone()
    }
}

impl From<PreparedImage> for JsPreparedImage {
    fn from(inner: PreparedImage) -> Self {
        Self { inner }
    }
}
