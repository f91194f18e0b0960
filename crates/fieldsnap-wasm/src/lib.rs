//! fieldsnap WASM - browser bindings for the fieldsnap photo pipeline
//!
//! # Module Structure
//!
//! - `camera` - `getUserMedia` camera provider and `JsCameraSession`
//! - `compress` - Size-targeted compression and upload preparation
//! - `types` - WASM-compatible wrapper types for image data
//! - `session` - Camera session slot that survives close-during-open
//! - `logger` - `log` records forwarded to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCameraSession, compress_image } from '@fieldsnap/wasm';
//!
//! await init();
//!
//! const camera = new JsCameraSession();
//! await camera.open('environment');
//! const photo = compress_image(camera.capture_frame(), { maxSizeBytes: 200000 });
//! camera.close();
//! console.log(`${photo.size_bytes} bytes, met target: ${photo.met_target}`);
//! ```

use wasm_bindgen::prelude::*;

mod camera;
mod compress;
mod logger;
mod session;
mod types;

pub use camera::{BrowserCamera, BrowserStream, JsCameraSession};
pub use compress::{compress_image, compress_photo, decode_file, default_profiles, profiles_from_json};
pub use logger::set_log_level;
pub use types::{JsEncodedImage, JsPreparedImage, JsRawImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
