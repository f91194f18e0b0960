//! Iterative quality-then-dimension search against a byte budget.

use log::{debug, info, warn};

use super::target::CompressionTarget;
use crate::encode::{EncodeError, Encoder};
use crate::{EncodedImage, EncodingParameters, RawImage};

const QUALITY_EPSILON: f32 = 1e-4;

/// Parameters of one step of the search.
///
/// Each state is derived from the previous one by [`AttemptState::next`]
/// alone, so a sequence of attempts can be replayed without an encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptState {
    /// Zero-based attempt index.
    pub attempt: u32,
    pub quality: f32,
    pub dimension: u32,
}

impl AttemptState {
    /// First state for `image` under a normalized `target`.
    ///
    /// The dimension starts at the target cap, lowered to the image's own
    /// longer edge so that later reductions always shrink the output.
    pub fn initial(target: &CompressionTarget, image: &RawImage) -> Self {
        Self {
            attempt: 0,
            quality: target.initial_quality,
            dimension: target.max_dimension.min(image.longest_edge()).max(1),
        }
    }

    pub fn params(&self) -> EncodingParameters {
        EncodingParameters::new(self.dimension, self.quality)
    }

    /// The state to try after an over-budget attempt.
    ///
    /// Quality drops by one step until it reaches the floor. At the floor the
    /// dimension is scaled down and quality resets to the fallback value.
    /// Returns `None` once both quality and dimension are at their floors.
    pub fn next(&self, target: &CompressionTarget) -> Option<Self> {
        let attempt = self.attempt + 1;

        if self.quality > target.min_quality + QUALITY_EPSILON {
            let quality = (self.quality - target.quality_step).max(target.min_quality);
            return Some(Self {
                attempt,
                quality,
                dimension: self.dimension,
            });
        }

        let fallback = &target.dimension_fallback;
        let floor = fallback.min_dimension.min(self.dimension);
        let scaled = (self.dimension as f32 * fallback.scale).floor() as u32;
        let dimension = scaled.max(floor).max(1);
        if dimension >= self.dimension {
            return None;
        }

        Some(Self {
            attempt,
            quality: fallback.reset_quality,
            dimension,
        })
    }
}

/// Parameters and measured outcome of one encoder call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptRecord {
    pub params: EncodingParameters,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
}

/// Whether the returned image satisfies the byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// The image is within `max_size_bytes`.
    Met,
    /// The search ran out of attempts or reductions; the image is the
    /// smallest one produced.
    NotMet,
    /// The caller stopped the search; the image is the smallest so far.
    Cancelled,
}

/// Result of a compression call.
#[derive(Debug, Clone)]
pub struct Compression {
    pub image: EncodedImage,
    /// Every encoder call in order.
    pub attempts: Vec<AttemptRecord>,
    pub status: BudgetStatus,
}

impl Compression {
    pub fn encode_calls(&self) -> usize {
        self.attempts.len()
    }

    pub fn met_target(&self) -> bool {
        self.status == BudgetStatus::Met
    }

    pub fn into_image(self) -> EncodedImage {
        self.image
    }
}

/// Drives an [`Encoder`] until its output fits a [`CompressionTarget`].
#[derive(Debug, Clone, Default)]
pub struct Compressor<E> {
    encoder: E,
}

impl<E: Encoder> Compressor<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }

    /// Compress `image` towards `target`.
    ///
    /// Returns as soon as an attempt is within budget. A budget that cannot be
    /// reached is not an error: the smallest attempt is returned with
    /// [`BudgetStatus::NotMet`].
    ///
    /// # Errors
    ///
    /// Encoder failures propagate unchanged and end the search.
    pub fn compress(
        &self,
        image: &RawImage,
        target: &CompressionTarget,
    ) -> Result<Compression, EncodeError> {
        self.compress_with(image, target, |_| true)
    }

    /// Like [`compress`](Self::compress), consulting `keep_going` after every
    /// over-budget attempt that would be followed by another one.
    pub fn compress_with<F>(
        &self,
        image: &RawImage,
        target: &CompressionTarget,
        mut keep_going: F,
    ) -> Result<Compression, EncodeError>
    where
        F: FnMut(&AttemptRecord) -> bool,
    {
        let target = target.normalized();
        let mut state = AttemptState::initial(&target, image);
        let mut attempts = Vec::new();

        let (mut best, mut last) = self.attempt(image, &state)?;
        attempts.push(last);

        let status = loop {
            if last.size_bytes <= target.max_size_bytes {
                info!(
                    "compressed {}x{} to {} bytes in {} attempt(s)",
                    image.width,
                    image.height,
                    last.size_bytes,
                    attempts.len()
                );
                break BudgetStatus::Met;
            }
            if attempts.len() >= target.max_attempts as usize {
                break BudgetStatus::NotMet;
            }
            let Some(next) = state.next(&target) else {
                break BudgetStatus::NotMet;
            };
            if !keep_going(&last) {
                break BudgetStatus::Cancelled;
            }

            state = next;
            let (encoded, record) = self.attempt(image, &state)?;
            attempts.push(record);
            last = record;
            if encoded.size_bytes() < best.size_bytes() {
                best = encoded;
            }
        };

        if status != BudgetStatus::Met {
            warn!(
                "budget of {} bytes not met after {} attempt(s), best {} bytes",
                target.max_size_bytes,
                attempts.len(),
                best.size_bytes()
            );
        }

        Ok(Compression {
            image: best,
            attempts,
            status,
        })
    }

    fn attempt(
        &self,
        image: &RawImage,
        state: &AttemptState,
    ) -> Result<(EncodedImage, AttemptRecord), EncodeError> {
        let params = state.params();
        let encoded = self.encoder.encode(image, &params)?;
        let record = AttemptRecord {
            params,
            size_bytes: encoded.size_bytes(),
            width: encoded.width,
            height: encoded.height,
        };
        debug!(
            "attempt {}: quality {:.2}, max dimension {} -> {}x{}, {} bytes",
            state.attempt + 1,
            params.quality.value(),
            params.max_dimension,
            record.width,
            record.height,
            record.size_bytes
        );
        Ok((encoded, record))
    }
}
