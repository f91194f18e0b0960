//! Camera stream ownership and the per-handle state machine.
//!
//! A [`StreamHandle`] is `Closed` or `Open`. Opening is the only
//! asynchronous step; sampling a frame is a synchronous read of the current
//! video frame. Hardware tracks are released on `close`, on drop, and before
//! a [`CameraSession`] opens a replacement stream, so at most one camera is
//! held per session at any time.

use std::future::Future;

use log::debug;
use serde::{Deserialize, Serialize};

use super::CaptureError;
use crate::RawImage;

/// Which camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Selfie camera (`facingMode: "user"`).
    #[serde(rename = "user")]
    Front,
    /// Rear camera (`facingMode: "environment"`).
    #[default]
    #[serde(rename = "environment")]
    Back,
}

impl Facing {
    /// The browser `facingMode` constraint value.
    pub fn as_facing_mode(self) -> &'static str {
        match self {
            Facing::Front => "user",
            Facing::Back => "environment",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

/// Preferred ("ideal") capture resolution. Devices may deliver less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionHint {
    pub width: u32,
    pub height: u32,
}

impl Default for ResolutionHint {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Everything a provider needs to open a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamRequest {
    pub facing: Facing,
    pub resolution: ResolutionHint,
}

/// A live hardware stream.
pub trait CameraStream {
    /// Sample the current frame at the stream's native resolution.
    fn sample(&mut self) -> Result<RawImage, CaptureError>;

    /// Release every underlying track. Must be idempotent.
    fn stop(&mut self);
}

/// Source of camera streams, e.g. `getUserMedia`.
pub trait StreamProvider {
    type Stream: CameraStream;

    /// Request a stream. Fails with [`CaptureError::DeviceUnavailable`] when
    /// no camera matches or permission is denied. Callers must not retry a
    /// failed open on their own.
    fn open(
        &self,
        request: &StreamRequest,
    ) -> impl Future<Output = Result<Self::Stream, CaptureError>>;
}

/// Exclusively owned handle to one open stream.
///
/// Dropping the handle releases the hardware.
#[derive(Debug)]
pub struct StreamHandle<S: CameraStream> {
    stream: Option<S>,
    request: StreamRequest,
}

impl<S: CameraStream> StreamHandle<S> {
    /// Open a stream through `provider`.
    pub async fn open<P>(provider: &P, request: StreamRequest) -> Result<Self, CaptureError>
    where
        P: StreamProvider<Stream = S>,
    {
        let stream = provider.open(&request).await?;
        debug!(
            "camera stream opened (facing {})",
            request.facing.as_facing_mode()
        );
        Ok(Self::from_stream(stream, request))
    }

    /// Wrap an already opened stream.
    pub fn from_stream(stream: S, request: StreamRequest) -> Self {
        Self {
            stream: Some(stream),
            request,
        }
    }

    /// Sample a frame. Can be called any number of times while open.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::StreamClosed`] once the handle is closed.
    pub fn capture_frame(&mut self) -> Result<RawImage, CaptureError> {
        match self.stream.as_mut() {
            Some(stream) => stream.sample(),
            None => Err(CaptureError::StreamClosed),
        }
    }

    /// Release the hardware. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!(
                "camera stream closed (facing {})",
                self.request.facing.as_facing_mode()
            );
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn facing(&self) -> Facing {
        self.request.facing
    }

    pub fn request(&self) -> StreamRequest {
        self.request
    }
}

impl<S: CameraStream> Drop for StreamHandle<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Owns a provider and at most one open [`StreamHandle`].
pub struct CameraSession<P: StreamProvider> {
    provider: P,
    handle: Option<StreamHandle<P::Stream>>,
}

impl<P: StreamProvider> CameraSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            handle: None,
        }
    }

    /// Open the camera facing `facing`.
    ///
    /// Any stream already held is closed before the new request is made. On
    /// failure the session is left closed.
    pub async fn open(
        &mut self,
        facing: Facing,
        resolution: ResolutionHint,
    ) -> Result<(), CaptureError> {
        self.close();
        let request = StreamRequest { facing, resolution };
        self.handle = Some(StreamHandle::open(&self.provider, request).await?);
        Ok(())
    }

    /// Close the current stream and reopen with `facing`, keeping the
    /// resolution hint. Opens with the default hint when nothing was open.
    pub async fn switch_facing(&mut self, facing: Facing) -> Result<(), CaptureError> {
        let resolution = self
            .handle
            .as_ref()
            .map(|handle| handle.request().resolution)
            .unwrap_or_default();
        self.open(facing, resolution).await
    }

    /// Sample a frame from the open stream.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::StreamClosed`] when no stream is open.
    pub fn capture_frame(&mut self) -> Result<RawImage, CaptureError> {
        match self.handle.as_mut() {
            Some(handle) => handle.capture_frame(),
            None => Err(CaptureError::StreamClosed),
        }
    }

    /// Release the current stream, if any.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.as_ref().is_some_and(StreamHandle::is_open)
    }

    /// Facing of the open stream.
    pub fn facing(&self) -> Option<Facing> {
        self.handle.as_ref().map(StreamHandle::facing)
    }
}

impl<P: StreamProvider> Drop for CameraSession<P> {
    fn drop(&mut self) {
        self.close();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_helpers::FakeCamera;
    use futures::executor::block_on;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Open(bool),
        Capture,
        Close,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Open),
            Just(Op::Capture),
            Just(Op::Close),
        ]
    }

    proptest! {
        /// Property: opens and releases balance 1:1 and never overlap, whatever
        /// the call sequence and whether opens succeed.
        #[test]
        fn prop_streams_balance(
            ops in prop::collection::vec(op_strategy(), 0..24),
            deny in any::<bool>(),
        ) {
            let camera = FakeCamera { deny, ..FakeCamera::new() };
            {
                let mut session = CameraSession::new(camera.clone());
                for op in ops {
                    match op {
                        Op::Open(front) => {
                            let facing = if front { Facing::Front } else { Facing::Back };
                            let result = block_on(session.open(facing, ResolutionHint::default()));
                            prop_assert_eq!(result.is_ok(), !deny);
                        }
                        Op::Capture => {
                            let result = session.capture_frame();
                            prop_assert_eq!(result.is_ok(), session.is_open());
                        }
                        Op::Close => session.close(),
                    }
                    prop_assert!(camera.ledger.live.get() <= 1);
                }
            }
            prop_assert!(camera.ledger.peak.get() <= 1);
            prop_assert_eq!(camera.ledger.live.get(), 0);
            prop_assert_eq!(camera.ledger.opened.get(), camera.ledger.closed.get());
        }
    }
}
