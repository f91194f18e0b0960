//! Session slot shared between `JsCameraSession` and its pending opens.
//!
//! An open takes the session out of the slot synchronously, before any
//! future is scheduled, and puts it back once the open settles. A `close`
//! that finds the slot empty is recorded and applied as soon as the session
//! is returned, so an open followed by an immediate close never leaves the
//! camera running.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use fieldsnap_core::capture::StreamProvider;
use fieldsnap_core::{CameraSession, CaptureError, Facing, RawImage, ResolutionHint};
use thiserror::Error;

/// Errors raised by the session slot.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An open is still waiting on the browser.
    #[error("Camera is still opening")]
    Busy,

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// What a pending open should do with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenRequest {
    Open(Facing, ResolutionHint),
    Switch(Facing),
}

pub struct SessionSlot<P: StreamProvider> {
    /// `None` while an open is in flight.
    session: RefCell<Option<CameraSession<P>>>,
    close_requested: Cell<bool>,
}

impl<P> SessionSlot<P>
where
    P: StreamProvider + 'static,
{
    pub fn new(provider: P) -> Rc<Self> {
        Rc::new(Self {
            session: RefCell::new(Some(CameraSession::new(provider))),
            close_requested: Cell::new(false),
        })
    }

    /// Take the session and return the future that opens it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while another open is in flight.
    pub fn begin(
        slot: &Rc<Self>,
        request: OpenRequest,
    ) -> Result<impl Future<Output = Result<(), SessionError>> + 'static, SessionError> {
        let mut session = slot.session.borrow_mut().take().ok_or(SessionError::Busy)?;
        slot.close_requested.set(false);
        let slot = Rc::clone(slot);

        Ok(async move {
            let result = match request {
                OpenRequest::Open(facing, hint) => session.open(facing, hint).await,
                OpenRequest::Switch(facing) => session.switch_facing(facing).await,
            };
            if slot.close_requested.replace(false) {
                session.close();
            }
            *slot.session.borrow_mut() = Some(session);
            result.map_err(SessionError::from)
        })
    }

    /// Release the camera now, or as soon as a pending open settles.
    pub fn close(&self) {
        match self.session.borrow_mut().as_mut() {
            Some(session) => session.close(),
            None => self.close_requested.set(true),
        }
    }

    pub fn capture_frame(&self) -> Result<RawImage, SessionError> {
        let mut guard = self.session.borrow_mut();
        let session = guard.as_mut().ok_or(SessionError::Busy)?;
        Ok(session.capture_frame()?)
    }

    pub fn is_open(&self) -> bool {
        self.session
            .borrow()
            .as_ref()
            .is_some_and(CameraSession::is_open)
    }

    pub fn facing(&self) -> Option<Facing> {
        self.session.borrow().as_ref().and_then(CameraSession::facing)
    }
}
