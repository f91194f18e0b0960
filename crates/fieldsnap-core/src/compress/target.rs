//! Compression policy: byte budgets, search bounds and named profiles.
//!
//! A [`CompressionTarget`] is plain configuration. It deserializes from the
//! camelCase JSON the web client already sends and is always passed through
//! [`CompressionTarget::normalized`] before the compressor reads it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Quality;

/// Byte budget meaning "no cap". The largest integer a JavaScript number
/// holds exactly, so the value survives the trip to and from the web client.
pub const UNLIMITED_SIZE: u64 = (1 << 53) - 1;

/// Errors raised while loading compression configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed
    #[error("Invalid compression config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the compressor trades resolution for size once quality is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionFallback {
    /// Factor applied to the current dimension, in `(0, 1)`.
    pub scale: f32,
    /// The dimension is never reduced below this many pixels.
    pub min_dimension: u32,
    /// Quality to resume from after a dimension reduction.
    pub reset_quality: f32,
}

impl Default for DimensionFallback {
    fn default() -> Self {
        Self {
            scale: 0.5,
            min_dimension: 320,
            reset_quality: 0.6,
        }
    }
}

/// The caller's byte budget and the bounds of the parameter search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionTarget {
    /// Largest acceptable payload in bytes.
    pub max_size_bytes: u64,
    /// Longest-edge cap for the first attempt.
    pub max_dimension: u32,
    pub initial_quality: f32,
    pub min_quality: f32,
    pub quality_step: f32,
    /// Upper bound on encoder invocations.
    pub max_attempts: u32,
    pub dimension_fallback: DimensionFallback,
}

impl Default for CompressionTarget {
    fn default() -> Self {
        Self::evidence_photo()
    }
}

impl CompressionTarget {
    /// Transient visit evidence: hard 200 KB cap.
    pub fn evidence_photo() -> Self {
        Self {
            max_size_bytes: 200_000,
            max_dimension: 1920,
            initial_quality: 0.8,
            min_quality: 0.3,
            quality_step: 0.1,
            max_attempts: 6,
            dimension_fallback: DimensionFallback::default(),
        }
    }

    /// Primary product photography: no byte cap, one pass at 0.8 / 1920.
    pub fn product_photo() -> Self {
        Self {
            max_size_bytes: UNLIMITED_SIZE,
            max_dimension: 1920,
            initial_quality: 0.8,
            min_quality: 0.8,
            quality_step: 0.1,
            max_attempts: 1,
            dimension_fallback: DimensionFallback {
                reset_quality: 0.8,
                ..Default::default()
            },
        }
    }

    /// Return a copy with every field forced into its valid range.
    ///
    /// Qualities land in `(0, 1]` with `min_quality <= initial_quality`, the
    /// step is positive and every count or size is at least one.
    pub fn normalized(&self) -> Self {
        let initial_quality = Quality::new(self.initial_quality).value();
        let min_quality = Quality::new(self.min_quality).value().min(initial_quality);
        let quality_step = if self.quality_step.is_finite() && self.quality_step > 0.0 {
            self.quality_step
        } else {
            0.1
        };

        let fallback = self.dimension_fallback;
        let scale = if fallback.scale > 0.0 && fallback.scale < 1.0 {
            fallback.scale
        } else {
            DimensionFallback::default().scale
        };
        let reset_quality = Quality::new(fallback.reset_quality)
            .value()
            .clamp(min_quality, initial_quality);

        Self {
            max_size_bytes: self.max_size_bytes.max(1),
            max_dimension: self.max_dimension.max(1),
            initial_quality,
            min_quality,
            quality_step,
            max_attempts: self.max_attempts.max(1),
            dimension_fallback: DimensionFallback {
                scale,
                min_dimension: fallback.min_dimension.max(1),
                reset_quality,
            },
        }
    }
}

/// Named targets used across the application's photo flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionProfiles {
    pub evidence: CompressionTarget,
    pub product: CompressionTarget,
}

impl Default for CompressionProfiles {
    fn default() -> Self {
        Self {
            evidence: CompressionTarget::evidence_photo(),
            product: CompressionTarget::product_photo(),
        }
    }
}

impl CompressionProfiles {
    /// Parse profiles from JSON. Missing profiles and fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let profiles: Self = serde_json::from_str(json)?;
        Ok(Self {
            evidence: profiles.evidence.normalized(),
            product: profiles.product.normalized(),
        })
    }
}
