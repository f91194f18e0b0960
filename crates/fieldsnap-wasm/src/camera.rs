//! Browser camera over `getUserMedia`.
//!
//! [`BrowserCamera`] is the [`StreamProvider`] the core session drives. A
//! stream is attached to an off-DOM `<video>` element and frames are read
//! back through a `<canvas>` 2D context. [`JsCameraSession`] is the handle
//! the page holds while its capture screen is mounted.
//!
//! # Example
//!
//! ```typescript
//! import { JsCameraSession } from '@fieldsnap/wasm';
//!
//! const camera = new JsCameraSession();
//! await camera.open('environment');
//! const frame = camera.capture_frame();
//! camera.close(); // also on unmount / navigation
//! ```

use std::rc::Rc;

use fieldsnap_core::capture::{CameraStream, StreamProvider, StreamRequest};
use fieldsnap_core::{CaptureError, Facing, RawImage, ResolutionHint};
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    CanvasRenderingContext2d, DomException, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack, Window,
};

use crate::session::{OpenRequest, SessionSlot};
use crate::types::JsRawImage;

/// Human-readable description of a rejected browser call.
fn describe(value: &JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| "unknown browser error".to_string())
}

fn unavailable(value: &JsValue) -> CaptureError {
    CaptureError::DeviceUnavailable(describe(value))
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(drop)
}

fn ideal(value: JsValue) -> Result<JsValue, JsValue> {
    let constraint = Object::new();
    set(&constraint, "ideal", &value)?;
    Ok(constraint.into())
}

/// `{ video: { facingMode: { ideal }, width: { ideal }, height: { ideal } }, audio: false }`
fn constraints(request: &StreamRequest) -> Result<MediaStreamConstraints, JsValue> {
    let video = Object::new();
    set(
        &video,
        "facingMode",
        &ideal(JsValue::from_str(request.facing.as_facing_mode()))?,
    )?;
    set(&video, "width", &ideal(request.resolution.width.into())?)?;
    set(&video, "height", &ideal(request.resolution.height.into())?)?;

    let constraints = Object::new();
    set(&constraints, "video", &video)?;
    set(&constraints, "audio", &JsValue::FALSE)?;
    Ok(constraints.unchecked_into())
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// Camera provider backed by `navigator.mediaDevices`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserCamera;

impl BrowserCamera {
    async fn attach(
        window: &Window,
        stream: &MediaStream,
    ) -> Result<(HtmlVideoElement, HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        video.set_muted(true);
        video.set_attribute("playsinline", "")?;
        video.set_src_object(Some(stream));
        JsFuture::from(video.play()?).await?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d canvas context unavailable"))?
            .dyn_into()?;

        Ok((video, canvas, ctx))
    }
}

impl StreamProvider for BrowserCamera {
    type Stream = BrowserStream;

    async fn open(&self, request: &StreamRequest) -> Result<BrowserStream, CaptureError> {
        let window = web_sys::window()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no browser window".to_string()))?;
        let devices = window.navigator().media_devices().map_err(|e| unavailable(&e))?;
        let constraints = constraints(request).map_err(|e| unavailable(&e))?;
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| unavailable(&e))?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(|e| unavailable(&e))?
            .dyn_into()
            .map_err(|e| unavailable(&e))?;

        match Self::attach(&window, &stream).await {
            Ok((video, canvas, ctx)) => Ok(BrowserStream {
                stream,
                video,
                canvas,
                ctx,
                stopped: false,
            }),
            Err(e) => {
                stop_tracks(&stream);
                Err(unavailable(&e))
            }
        }
    }
}

/// A live `MediaStream` with its video and canvas elements.
pub struct BrowserStream {
    stream: MediaStream,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    stopped: bool,
}

impl CameraStream for BrowserStream {
    fn sample(&mut self) -> Result<RawImage, CaptureError> {
        if self.stopped {
            return Err(CaptureError::StreamClosed);
        }
        let (width, height) = (self.video.video_width(), self.video.video_height());
        if width == 0 || height == 0 {
            return Err(CaptureError::DeviceUnavailable(
                "camera has not delivered a frame yet".to_string(),
            ));
        }

        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.ctx
            .draw_image_with_html_video_element(&self.video, 0.0, 0.0)
            .map_err(|e| unavailable(&e))?;
        let data = self
            .ctx
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|e| unavailable(&e))?;

        Ok(RawImage::from_rgba(width, height, &data.data().0))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        stop_tracks(&self.stream);
        self.video.set_src_object(None);
        self.stopped = true;
    }
}

impl Drop for BrowserStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `"user"`/`"front"` select the front camera; anything else the rear one.
pub(crate) fn parse_facing(facing: Option<&str>) -> Facing {
    match facing.map(str::to_ascii_lowercase).as_deref() {
        Some("user") | Some("front") => Facing::Front,
        _ => Facing::Back,
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Camera session for one mounted capture screen.
///
/// Holds at most one stream. Opening again, or switching cameras, releases
/// the current stream first. Call `close()` when the screen unmounts.
#[wasm_bindgen]
pub struct JsCameraSession {
    slot: Rc<SessionSlot<BrowserCamera>>,
}

impl Default for JsCameraSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsCameraSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsCameraSession {
        JsCameraSession {
            slot: SessionSlot::new(BrowserCamera),
        }
    }

    /// Open the camera. Resolves once frames are flowing; rejects with a
    /// user-facing message when the camera is unavailable or permission is
    /// denied.
    ///
    /// # Arguments
    ///
    /// * `facing` - `"environment"` (default) or `"user"`
    /// * `width`, `height` - Ideal resolution, default 1920x1080
    pub fn open(&self, facing: Option<String>, width: Option<u32>, height: Option<u32>) -> Promise {
        let default = ResolutionHint::default();
        let hint = ResolutionHint {
            width: width.unwrap_or(default.width),
            height: height.unwrap_or(default.height),
        };
        self.run(OpenRequest::Open(parse_facing(facing.as_deref()), hint))
    }

    /// Release the current camera and open the one facing `facing`.
    pub fn switch_facing(&self, facing: &str) -> Promise {
        self.run(OpenRequest::Switch(parse_facing(Some(facing))))
    }

    /// Grab the current frame at native resolution. Can be called again to retake.
    pub fn capture_frame(&self) -> Result<JsRawImage, JsValue> {
        self.slot
            .capture_frame()
            .map(JsRawImage::from_raw)
            .map_err(to_js_error)
    }

    /// Release the camera. Safe to call at any time, including right after
    /// `open()` and while it is pending.
    pub fn close(&self) {
        self.slot.close();
    }

    #[wasm_bindgen(getter)]
    pub fn is_open(&self) -> bool {
        self.slot.is_open()
    }

    /// `"user"` or `"environment"` while open.
    #[wasm_bindgen(getter)]
    pub fn facing(&self) -> Option<String> {
        self.slot
            .facing()
            .map(|facing| facing.as_facing_mode().to_string())
    }
}

impl JsCameraSession {
    fn run(&self, request: OpenRequest) -> Promise {
        match SessionSlot::begin(&self.slot, request) {
            Ok(opening) => future_to_promise(async move {
                opening.await.map(|()| JsValue::UNDEFINED).map_err(to_js_error)
            }),
            Err(e) => Promise::reject(&to_js_error(e)),
        }
    }
}
