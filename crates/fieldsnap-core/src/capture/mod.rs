//! Capture Source: camera streams and gallery files.
//!
//! Two ways to obtain a [`RawImage`](crate::RawImage):
//! - [`CameraSession`] / [`StreamHandle`] over a [`StreamProvider`] for live
//!   capture, with guaranteed release of the camera on every exit path
//! - [`from_file`] for images picked from the gallery

mod file;
mod stream;

use thiserror::Error;

pub use file::{from_file, read_orientation, sniff_mime, Orientation};
pub use stream::{
    CameraSession, CameraStream, Facing, ResolutionHint, StreamHandle, StreamProvider,
    StreamRequest,
};

/// Errors raised while acquiring an image.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No camera matched, permission was denied, or the device is locked by
    /// another consumer.
    #[error("Camera unavailable ({0}). Check that camera permission is granted and no other app is using it.")]
    DeviceUnavailable(String),

    /// The stream was closed before the frame was requested.
    #[error("Camera stream is closed")]
    StreamClosed,

    /// The picked file could not be decoded as an image.
    #[error("Could not read image file: {0}")]
    InvalidFile(String),
}
