//! Shared fixtures and fakes for unit tests.

use std::cell::{Cell, RefCell};
use std::future::{ready, Future};
use std::rc::Rc;

use crate::capture::{CameraStream, CaptureError, StreamProvider, StreamRequest};
use crate::encode::{fit_dimensions, EncodeError, Encoder};
use crate::{EncodedImage, EncodingParameters, RawImage};

/// Simple RGB gradient.
pub fn gradient_image(width: u32, height: u32) -> RawImage {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(((x * 255) / width.max(1)) as u8);
            pixels.push(((y * 255) / height.max(1)) as u8);
            pixels.push(128);
        }
    }
    RawImage::new(width, height, pixels)
}

/// Deterministic high-frequency content that compresses poorly.
pub fn noise_image(width: u32, height: u32) -> RawImage {
    let mut state: u32 = 0x1234_5678;
    let pixels = (0..width * height * 3)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect();
    RawImage::new(width, height, pixels)
}

/// Image with the given dimensions whose pixels are never read by fakes.
pub fn blank_image(width: u32, height: u32) -> RawImage {
    RawImage::new(width, height, vec![0u8; width as usize * height as usize * 3])
}

/// Encoder that replays a fixed sequence of output sizes.
///
/// Output dimensions follow the real resize policy. Once the script runs
/// out the last size repeats.
pub struct ScriptedEncoder {
    sizes: Vec<u64>,
    calls: RefCell<Vec<EncodingParameters>>,
}

impl ScriptedEncoder {
    pub fn new(sizes: Vec<u64>) -> Self {
        assert!(!sizes.is_empty(), "script needs at least one size");
        Self {
            sizes,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<EncodingParameters> {
        self.calls.borrow().clone()
    }
}

impl Encoder for ScriptedEncoder {
    fn encode(
        &self,
        image: &RawImage,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        let mut calls = self.calls.borrow_mut();
        let index = calls.len().min(self.sizes.len() - 1);
        calls.push(*params);

        let (width, height) = fit_dimensions(image.width, image.height, params.max_dimension);
        Ok(EncodedImage::new(
            vec![0u8; self.sizes[index] as usize],
            width,
            height,
        ))
    }
}

/// Encoder whose output size is proportional to pixel count and quality.
pub struct ModelEncoder {
    pub bytes_per_pixel_at_full_quality: f64,
}

impl Encoder for ModelEncoder {
    fn encode(
        &self,
        image: &RawImage,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        if image.is_empty() {
            return Err(EncodeError::EmptyImage);
        }
        let (width, height) = fit_dimensions(image.width, image.height, params.max_dimension);
        let size = (width as f64
            * height as f64
            * params.quality.value() as f64
            * self.bytes_per_pixel_at_full_quality)
            .ceil() as usize;
        Ok(EncodedImage::new(vec![0u8; size.max(1)], width, height))
    }
}

/// Encoder that always fails.
pub struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn encode(
        &self,
        _image: &RawImage,
        _params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        Err(EncodeError::EncodingFailed("scripted failure".to_string()))
    }
}

/// Counters shared between a [`FakeCamera`] and the streams it opens.
#[derive(Debug, Default)]
pub struct CameraLedger {
    /// Successful opens.
    pub opened: Cell<u32>,
    /// Track releases.
    pub closed: Cell<u32>,
    /// Streams currently holding the device.
    pub live: Cell<u32>,
    /// Highest number of simultaneously live streams.
    pub peak: Cell<u32>,
    /// Open requests, in order.
    pub requests: RefCell<Vec<StreamRequest>>,
}

/// In-memory camera that records every open and release.
#[derive(Debug, Clone)]
pub struct FakeCamera {
    pub ledger: Rc<CameraLedger>,
    pub frame_size: (u32, u32),
    pub deny: bool,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            ledger: Rc::new(CameraLedger::default()),
            frame_size: (64, 48),
            deny: false,
        }
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::new()
        }
    }
}

impl StreamProvider for FakeCamera {
    type Stream = FakeStream;

    fn open(&self, request: &StreamRequest) -> impl Future<Output = Result<FakeStream, CaptureError>> {
        self.ledger.requests.borrow_mut().push(*request);
        if self.deny {
            return ready(Err(CaptureError::DeviceUnavailable(
                "NotAllowedError".to_string(),
            )));
        }

        let ledger = &self.ledger;
        ledger.opened.set(ledger.opened.get() + 1);
        ledger.live.set(ledger.live.get() + 1);
        ledger.peak.set(ledger.peak.get().max(ledger.live.get()));

        ready(Ok(FakeStream {
            ledger: Rc::clone(&self.ledger),
            frame_size: self.frame_size,
            frames: 0,
            stopped: false,
        }))
    }
}

#[derive(Debug)]
pub struct FakeStream {
    ledger: Rc<CameraLedger>,
    frame_size: (u32, u32),
    frames: u8,
    stopped: bool,
}

impl CameraStream for FakeStream {
    fn sample(&mut self) -> Result<RawImage, CaptureError> {
        if self.stopped {
            return Err(CaptureError::StreamClosed);
        }
        self.frames = self.frames.wrapping_add(1);
        let (width, height) = self.frame_size;
        Ok(RawImage::new(
            width,
            height,
            vec![self.frames; width as usize * height as usize * 3],
        ))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let ledger = &self.ledger;
        ledger.closed.set(ledger.closed.get() + 1);
        ledger.live.set(ledger.live.get() - 1);
    }
}
