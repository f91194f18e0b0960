//! JPEG encoding for upload-ready photos.
//!
//! This module provides JPEG encoding using the `image` crate's JPEG encoder.
//! [`JpegEncoder`] combines longest-edge resizing with a quality-controlled
//! encode and is the production [`Encoder`] used by the compressor.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

use super::resize::{resize_to_fit, validate_buffer, FilterType};
use crate::{EncodedImage, EncodingParameters, RawImage};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The pixel buffer holds no data
    #[error("Cannot encode an empty image")]
    EmptyImage,

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Single-shot transform from pixels and parameters to an encoded artifact.
///
/// Implementations must be deterministic and hold no knowledge of byte budgets.
pub trait Encoder {
    fn encode(
        &self,
        image: &RawImage,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn encode(
        &self,
        image: &RawImage,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        (**self).encode(image, params)
    }
}

/// Resize-then-encode JPEG encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder {
    pub filter: FilterType,
}

impl JpegEncoder {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Encoder for JpegEncoder {
    fn encode(
        &self,
        image: &RawImage,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        let resized = resize_to_fit(image, params.max_dimension, self.filter)?;
        let payload = encode_jpeg(
            &resized.pixels,
            resized.width,
            resized.height,
            params.quality.to_jpeg_quality(),
        )?;

        Ok(EncodedImage::new(payload, resized.width, resized.height))
    }
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Returns
///
/// JPEG-encoded bytes on success, or an error if encoding fails.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(width, height, pixels.len())?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());

    ImageJpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every valid input produces a JPEG whose reported size is its length.
        #[test]
        fn prop_valid_input_produces_measured_jpeg(
            width in 1u32..=48,
            height in 1u32..=48,
            max_dimension in 1u32..=64,
            quality in 0.01f32..=1.0,
        ) {
            let image = RawImage::new(width, height, vec![100u8; (width * height * 3) as usize]);
            let encoded = JpegEncoder::default()
                .encode(&image, &EncodingParameters::new(max_dimension, quality))
                .unwrap();

            prop_assert_eq!(&encoded.payload()[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(encoded.size_bytes(), encoded.payload().len() as u64);
            prop_assert!(encoded.width.max(encoded.height) <= max_dimension);
            prop_assert!(encoded.width <= width && encoded.height <= height);
        }

        /// Property: same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            width in 1u32..=20,
            height in 1u32..=20,
            quality in 0.01f32..=1.0,
        ) {
            let image = RawImage::new(width, height, vec![100u8; (width * height * 3) as usize]);
            let params = EncodingParameters::new(16, quality);
            let encoder = JpegEncoder::default();

            let first = encoder.encode(&image, &params).unwrap();
            let second = encoder.encode(&image, &params).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
