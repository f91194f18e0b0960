//! Size-targeting compression.
//!
//! The [`Compressor`] repeatedly calls an [`Encoder`](crate::encode::Encoder),
//! lowering quality first and resolution second, until the output fits the
//! [`CompressionTarget`] byte budget or the attempt cap is reached.
//!
//! # Search order
//!
//! 1. Encode at the initial quality and the target's maximum dimension.
//! 2. While over budget, lower quality by `quality_step` down to `min_quality`.
//! 3. At `min_quality`, scale the dimension by `dimension_fallback.scale`
//!    (never below `dimension_fallback.min_dimension`) and resume from
//!    `dimension_fallback.reset_quality`.
//! 4. Stop at the first in-budget result, after `max_attempts` encoder calls,
//!    or when no reduction is left. An over-budget outcome returns the
//!    smallest attempt instead of an error.
//!
//! # Examples
//!
//! ```ignore
//! use fieldsnap_core::compress::{CompressionTarget, Compressor};
//! use fieldsnap_core::encode::JpegEncoder;
//!
//! let compressor = Compressor::new(JpegEncoder::default());
//! let result = compressor.compress(&raw, &CompressionTarget::evidence_photo())?;
//! upload(result.image.to_data_uri(), result.image.size_bytes());
//! ```

mod search;
mod target;

pub use search::{AttemptRecord, AttemptState, BudgetStatus, Compression, Compressor};
pub use target::{
    CompressionProfiles, CompressionTarget, ConfigError, DimensionFallback, UNLIMITED_SIZE,
};
