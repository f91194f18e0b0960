//! Encoder/Resizer stage of the pipeline.
//!
//! This module provides functionality for:
//! - Resizing an image so its longer edge fits a maximum dimension
//! - Encoding images to JPEG format with configurable quality
//!
//! # Architecture
//!
//! Encoding is a single-shot pure transform from a [`RawImage`](crate::RawImage)
//! and [`EncodingParameters`](crate::EncodingParameters) to an
//! [`EncodedImage`](crate::EncodedImage). It knows nothing about byte budgets;
//! the retry loop lives in [`compress`](crate::compress) and talks to the
//! encoder through the [`Encoder`] trait so it can be driven by a fake.
//!
//! # Examples
//!
//! ```ignore
//! use fieldsnap_core::encode::{Encoder, JpegEncoder};
//! use fieldsnap_core::{EncodingParameters, RawImage};
//!
//! let image = RawImage::new(100, 100, vec![128u8; 100 * 100 * 3]);
//! let encoded = JpegEncoder::default()
//!     .encode(&image, &EncodingParameters::new(64, 0.8))
//!     .unwrap();
//! println!("Encoded {} bytes", encoded.size_bytes());
//! ```

mod jpeg;
mod resize;

pub use jpeg::{encode_jpeg, EncodeError, Encoder, JpegEncoder};
pub use resize::{fit_dimensions, resize_to_fit, FilterType};
