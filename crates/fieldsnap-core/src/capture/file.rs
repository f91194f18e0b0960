//! Gallery path: decode an existing image file into a [`RawImage`].
//!
//! Phone photos usually carry their rotation in EXIF rather than in the
//! pixel data, so the orientation tag is applied before the image enters
//! the pipeline.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::CaptureError;
use crate::RawImage;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Decode an image file (JPEG or PNG) to RGB, applying EXIF orientation.
///
/// # Errors
///
/// Returns `CaptureError::InvalidFile` if the bytes are empty, in an
/// unsupported format or corrupted.
pub fn from_file(bytes: &[u8]) -> Result<RawImage, CaptureError> {
    if bytes.is_empty() {
        return Err(CaptureError::InvalidFile("file is empty".to_string()));
    }

    let orientation = read_orientation(bytes);

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CaptureError::InvalidFile(e.to_string()))?
        .decode()
        .map_err(|e| CaptureError::InvalidFile(e.to_string()))?;

    Ok(RawImage::from_rgb_image(
        apply_orientation(img, orientation).into_rgb8(),
    ))
}

/// MIME type sniffed from the file's magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Read the EXIF orientation tag, defaulting to `Normal`.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_jpeg;
    use crate::test_helpers::gradient_image;
    use image::ImageFormat;

    fn png_bytes(img: &RawImage) -> Vec<u8> {
        let rgb = img.to_rgb_image().unwrap();
        let mut out = Cursor::new(Vec::new());
        rgb.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_from_file_jpeg() {
        let img = gradient_image(40, 30);
        let jpeg = encode_jpeg(&img.pixels, 40, 30, 90).unwrap();

        let decoded = from_file(&jpeg).unwrap();
        assert_eq!((decoded.width, decoded.height), (40, 30));
        assert_eq!(decoded.pixels.len(), 40 * 30 * 3);
    }

    #[test]
    fn test_from_file_png_is_lossless() {
        let img = gradient_image(16, 8);
        let decoded = from_file(&png_bytes(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_from_file_empty() {
        assert!(matches!(from_file(&[]), Err(CaptureError::InvalidFile(_))));
    }

    #[test]
    fn test_from_file_garbage() {
        let result = from_file(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(CaptureError::InvalidFile(_))));
    }

    #[test]
    fn test_from_file_truncated_jpeg() {
        let img = gradient_image(40, 30);
        let jpeg = encode_jpeg(&img.pixels, 40, 30, 90).unwrap();
        assert!(from_file(&jpeg[..20]).is_err());
    }

    #[test]
    fn test_orientation_without_exif() {
        let img = gradient_image(4, 4);
        let jpeg = encode_jpeg(&img.pixels, 4, 4, 90).unwrap();
        assert_eq!(read_orientation(&jpeg), Orientation::Normal);
        assert_eq!(read_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let rotated = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::Rotate90CW);
        assert_eq!(rotated.into_rgb8().dimensions(), (1, 2));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let flipped = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::FlipHorizontal)
            .into_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(flipped.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_sniff_mime() {
        let img = gradient_image(4, 4);
        let jpeg = encode_jpeg(&img.pixels, 4, 4, 90).unwrap();
        assert_eq!(sniff_mime(&jpeg), "image/jpeg");
        assert_eq!(sniff_mime(&png_bytes(&img)), "image/png");
        assert_eq!(sniff_mime(b"hello"), "application/octet-stream");
    }
}
