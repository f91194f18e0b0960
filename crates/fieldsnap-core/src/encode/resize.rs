//! Longest-edge resizing ahead of encoding.
//!
//! The input image is never modified. When no resize is needed the input is
//! borrowed back rather than copied.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::EncodeError;
use crate::RawImage;

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Calculate dimensions to fit within `max_edge` while preserving aspect ratio.
///
/// The longer edge becomes exactly `max_edge`; the shorter edge is rounded
/// and never drops below one pixel. Images that already fit are returned
/// unchanged (no upscaling).
pub fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let max_edge = max_edge.max(1);
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

/// Resize an image so its longer edge is at most `max_edge`.
///
/// # Errors
///
/// Returns `EncodeError::EmptyImage` for an empty buffer,
/// `EncodeError::InvalidDimensions` for a zero width or height and
/// `EncodeError::InvalidPixelData` when the buffer does not match the dimensions.
pub fn resize_to_fit(
    image: &RawImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<Cow<'_, RawImage>, EncodeError> {
    validate(image)?;

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_edge);
    if (new_width, new_height) == (image.width, image.height) {
        return Ok(Cow::Borrowed(image));
    }

    let rgb_image = image.to_rgb_image().ok_or(EncodeError::InvalidPixelData {
        expected: image.width as usize * image.height as usize * 3,
        actual: image.pixels.len(),
    })?;
    let resized = image::imageops::resize(
        &rgb_image,
        new_width,
        new_height,
        filter.to_image_filter(),
    );

    Ok(Cow::Owned(RawImage::from_rgb_image(resized)))
}

pub(super) fn validate(image: &RawImage) -> Result<(), EncodeError> {
    validate_buffer(image.width, image.height, image.pixels.len())
}

pub(super) fn validate_buffer(width: u32, height: u32, len: usize) -> Result<(), EncodeError> {
    if len == 0 {
        return Err(EncodeError::EmptyImage);
    }
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * 3;
    if len != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: len,
        });
    }
    Ok(())
}
