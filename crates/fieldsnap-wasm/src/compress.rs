//! Compression WASM bindings.
//!
//! # Functions
//!
//! - [`compress_image`] - Compress a captured frame towards a byte budget
//! - [`compress_photo`] - Decode, compress, or fall back to the original file
//! - [`decode_file`] - Decode a gallery file into a `JsRawImage`
//! - [`default_profiles`] / [`profiles_from_json`] - Compression configuration
//!
//! # Example
//!
//! ```typescript
//! import { compress_photo, default_profiles } from '@fieldsnap/wasm';
//!
//! const { evidence } = default_profiles();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const prepared = compress_photo(bytes, evidence);
//! form.append('photo', prepared.data_uri);
//! ```

use fieldsnap_core::capture::from_file;
use fieldsnap_core::compress::CompressionProfiles;
use fieldsnap_core::{default_compressor, prepare_upload, CompressionTarget};
use wasm_bindgen::prelude::*;

use crate::types::{JsEncodedImage, JsPreparedImage, JsRawImage};

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Read a target from a plain JS object. `undefined`/`null` selects the
/// evidence preset; missing fields take their defaults.
pub(crate) fn target_from_js(value: JsValue) -> Result<CompressionTarget, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(CompressionTarget::default());
    }
    let target: CompressionTarget = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
    Ok(target.normalized())
}

/// Compress a raw image until it fits `target`.
///
/// # Arguments
///
/// * `image` - Frame from the camera or `decode_file`
/// * `target` - Compression target object, e.g. `{ maxSizeBytes: 200000 }`
///
/// # Returns
///
/// A `JsEncodedImage`. An over-budget result is still returned, with
/// `met_target === false`.
///
/// # Errors
///
/// Returns an error if the target object is malformed or the image is empty
/// or has inconsistent pixel data.
#[wasm_bindgen]
pub fn compress_image(image: &JsRawImage, target: JsValue) -> Result<JsEncodedImage, JsValue> {
    let target = target_from_js(target)?;
    default_compressor()
        .compress(&image.to_raw(), &target)
        .map(JsEncodedImage::from)
        .map_err(to_js_error)
}

/// Prepare an uploaded file. Never fails on image content: if decoding or
/// compression fails, the original bytes are returned with `compressed === false`.
///
/// # Errors
///
/// Only a malformed `target` object is reported as an error.
#[wasm_bindgen]
pub fn compress_photo(bytes: &[u8], target: JsValue) -> Result<JsPreparedImage, JsValue> {
    let target = target_from_js(target)?;
    Ok(prepare_upload(bytes, &target, &default_compressor()).into())
}

/// Decode a JPEG or PNG file to RGB, honouring EXIF orientation.
#[wasm_bindgen]
pub fn decode_file(bytes: &[u8]) -> Result<JsRawImage, JsValue> {
    from_file(bytes)
        .map(JsRawImage::from_raw)
        .map_err(to_js_error)
}

/// The built-in `{ evidence, product }` compression profiles.
#[wasm_bindgen]
pub fn default_profiles() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&CompressionProfiles::default()).map_err(to_js_error)
}

/// Parse profiles from a JSON configuration string.
#[wasm_bindgen]
pub fn profiles_from_json(json: &str) -> Result<JsValue, JsValue> {
    let profiles = CompressionProfiles::from_json(json).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&profiles).map_err(to_js_error)
}
