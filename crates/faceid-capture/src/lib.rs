#![warn(missing_docs)]
//! # faceid-capture
//!
//! ## Purpose
//! Owns the camera feed of the page and turns it into a compressed still
//! that a login or registration form can submit.
//!
//! ## Responsibilities
//! - Define backend-agnostic camera and stream traits.
//! - Hold the live stream in an explicitly owned slot that releases every
//!   track exactly once.
//! - Drive capture, retake, the registration submit guard, and teardown.
//! - Run the headless face-login sequence.
//! - Expose a deterministic synthetic camera for tests.
//!
//! ## Data flow
//! [`CameraBackend::acquire`] -> [`StreamSlot`] -> [`CameraStream::grab_frame`]
//! -> [`faceid_compress::compress`] -> hidden field value held by
//! [`CaptureController`].
//!
//! ## Concurrency
//! Everything runs on one event loop. The only suspension points are stream
//! acquisition, stream readiness, and the settle delay; none of them can be
//! cancelled, and teardown goes through [`StreamSlot::release`].
//!
//! ## Error model
//! Camera denial, frame grab, and compression failures are reported as
//! [`CaptureError`]; registration submit refusals as [`SubmitBlocked`]. Both
//! carry the alert text shown to the user.

mod synthetic;

use std::future::Future;
use std::time::Duration;

use faceid_compress::{CompressError, StillEncoder, compress};
use faceid_core::{CAPTURE_TARGET_KB, EncodedImage, Frame, HARD_CEILING_KB};
use faceid_ui::CaptureView;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use synthetic::{SyntheticCamera, SyntheticStream, TrackProbe};

/// Delay between stream readiness and the headless still grab, letting
/// auto-exposure and focus settle.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Alert shown when the camera cannot be opened for the preview.
pub const CAMERA_UNAVAILABLE_ALERT: &str =
    "Unable to access your camera. Please make sure it's connected and you've given permission.";

/// Alert shown when a captured still cannot be processed.
pub const PROCESSING_FAILED_ALERT: &str =
    "There was an error processing your photo. Please try again.";

/// Alert shown when the headless face-login sequence fails.
pub const HEADLESS_FAILURE_ALERT: &str =
    "Could not access webcam. Please check permissions and try again.";

/// Media constraints passed to the camera backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Request a video track.
    pub video: bool,
    /// Request an audio track.
    pub audio: bool,
}

impl StreamConstraints {
    /// Video without audio, the only request this page makes.
    pub const VIDEO_ONLY: StreamConstraints = StreamConstraints {
        video: true,
        audio: false,
    };
}

/// A live camera stream.
pub trait CameraStream {
    /// Returns the number of tracks carried by the stream.
    fn track_count(&self) -> usize;

    /// Sends a stop signal to every track.
    fn stop_all_tracks(&mut self);

    /// Resolves once the stream reports metadata and playback has started.
    ///
    /// # Errors
    /// Returns [`CaptureError::Stream`] when playback cannot start.
    fn wait_ready(&mut self) -> impl Future<Output = Result<(), CaptureError>>;

    /// Copies the current frame at the stream's native resolution.
    ///
    /// # Errors
    /// Returns [`CaptureError::Stream`] when no frame is available.
    fn grab_frame(&self) -> Result<Frame, CaptureError>;
}

/// Grants camera streams.
pub trait CameraBackend {
    /// Stream type produced by this backend.
    type Stream: CameraStream;

    /// Requests a stream matching `constraints`.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraUnavailable`] on denial or missing
    /// hardware.
    fn acquire(
        &self,
        constraints: StreamConstraints,
    ) -> impl Future<Output = Result<Self::Stream, CaptureError>>;
}

/// Waits a fixed delay on the page's event loop.
pub trait SettleTimer {
    /// Resolves after `delay`.
    fn settle(&self, delay: Duration) -> impl Future<Output = ()>;
}

/// Explicitly owned slot for the page's live stream.
///
/// # Invariant
/// A stream leaves the slot only through [`StreamSlot::release`], which stops
/// each of its tracks once. Installing a new stream releases the old one.
#[derive(Debug)]
pub struct StreamSlot<S: CameraStream> {
    stream: Option<S>,
}

impl<S: CameraStream> StreamSlot<S> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self { stream: None }
    }

    /// Stores `stream`, releasing any stream already held.
    pub fn install(&mut self, stream: S) {
        self.release();
        self.stream = Some(stream);
    }

    /// Stops every track of the held stream and empties the slot.
    ///
    /// # Returns
    /// `true` when a stream was released, `false` when the slot was empty.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                debug!(tracks = stream.track_count(), "releasing camera stream");
                stream.stop_all_tracks();
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a stream is held.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns the held stream.
    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    /// Returns the held stream mutably.
    pub fn stream_mut(&mut self) -> Option<&mut S> {
        self.stream.as_mut()
    }
}

impl<S: CameraStream> Default for StreamSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CameraStream> Drop for StreamSlot<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Capture widget controller for the registration page.
#[derive(Debug)]
pub struct CaptureController<S: CameraStream, E: StillEncoder> {
    slot: StreamSlot<S>,
    encoder: E,
    target_kb: f64,
    held: Option<EncodedImage>,
    view: CaptureView,
}

impl<S: CameraStream, E: StillEncoder> CaptureController<S, E> {
    /// Creates a controller with the default capture budget.
    pub fn new(encoder: E) -> Self {
        Self::with_target(encoder, CAPTURE_TARGET_KB)
    }

    /// Creates a controller compressing stills to `target_kb`.
    pub fn with_target(encoder: E, target_kb: f64) -> Self {
        Self {
            slot: StreamSlot::new(),
            encoder,
            target_kb,
            held: None,
            view: CaptureView::pristine(),
        }
    }

    /// Opens the live preview stream.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraUnavailable`] on denial. The controller
    /// then stays usable but [`CaptureController::capture`] refuses to run, so
    /// the hidden field is never populated.
    pub async fn acquire<B>(&mut self, backend: &B) -> Result<(), CaptureError>
    where
        B: CameraBackend<Stream = S>,
    {
        match backend.acquire(StreamConstraints::VIDEO_ONLY).await {
            Ok(stream) => {
                info!(tracks = stream.track_count(), "camera stream acquired");
                self.slot.install(stream);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "camera access failed");
                Err(error)
            }
        }
    }

    /// Replaces the preview stream, releasing the previous one first.
    pub fn replace_stream(&mut self, stream: S) {
        self.slot.install(stream);
    }

    /// Captures and compresses the current preview frame.
    ///
    /// On success the hidden field holds the compressed still and the view
    /// switches to the captured layout. On failure nothing changes.
    ///
    /// # Errors
    /// Returns [`CaptureError::NoStream`] without a stream, and propagates
    /// frame grab and compression failures.
    pub fn capture(&mut self) -> Result<&EncodedImage, CaptureError> {
        let stream = self.slot.stream().ok_or(CaptureError::NoStream)?;
        let frame = stream.grab_frame()?;
        let outcome = compress(&frame, self.target_kb, &self.encoder)?;

        info!(
            width = outcome.image.width,
            height = outcome.image.height,
            attempts = outcome.attempts.len(),
            "photo captured"
        );
        self.view = CaptureView::captured();
        Ok(self.held.insert(outcome.image))
    }

    /// Discards the held still and restores the live preview layout.
    pub fn retake(&mut self) {
        self.held = None;
        self.view = CaptureView::pristine();
    }

    /// Checks whether the registration form may submit.
    ///
    /// # Errors
    /// Returns [`SubmitBlocked::MissingImage`] when nothing was captured and
    /// [`SubmitBlocked::TooLarge`] when the held still exceeds the hard
    /// ceiling. The latter also forces a retake.
    pub fn submit_guard(&mut self) -> Result<(), SubmitBlocked> {
        let size_kb = match &self.held {
            None => return Err(SubmitBlocked::MissingImage),
            Some(image) => image.estimated_kb(),
        };

        if size_kb > HARD_CEILING_KB {
            warn!(size_kb, "captured photo exceeds submit ceiling; forcing retake");
            self.retake();
            return Err(SubmitBlocked::TooLarge { size_kb });
        }

        Ok(())
    }

    /// Returns `true` when the registration submit button should be enabled.
    pub fn submit_enabled(&self) -> bool {
        self.held.is_some()
    }

    /// Returns the hidden form field value (empty before capture).
    pub fn field_value(&self) -> &str {
        self.held.as_ref().map(EncodedImage::data_url).unwrap_or("")
    }

    /// Returns the held still.
    pub fn held(&self) -> Option<&EncodedImage> {
        self.held.as_ref()
    }

    /// Returns the widget layout to render.
    pub fn view(&self) -> CaptureView {
        self.view
    }

    /// Returns `true` while a preview stream is held.
    pub fn has_stream(&self) -> bool {
        self.slot.is_active()
    }

    /// Releases the preview stream. Safe to call repeatedly.
    ///
    /// # Returns
    /// `true` when a stream was released by this call.
    pub fn dispose(&mut self) -> bool {
        self.slot.release()
    }
}

/// Headless face-login capture: no preview, automatic submit afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessLogin {
    /// Delay between readiness and the grab.
    pub settle_delay: Duration,
    /// Compression budget in KB.
    pub target_kb: f64,
}

impl Default for HeadlessLogin {
    fn default() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            target_kb: CAPTURE_TARGET_KB,
        }
    }
}

impl HeadlessLogin {
    /// Acquires a dedicated stream, waits for readiness and the settle delay,
    /// grabs one still, compresses it, and releases the stream.
    ///
    /// The stream is released on success and on every failure after
    /// acquisition.
    ///
    /// # Errors
    /// Propagates acquisition, readiness, grab, and compression failures.
    pub async fn run<B, T, E>(
        &self,
        backend: &B,
        timer: &T,
        encoder: &E,
    ) -> Result<EncodedImage, CaptureError>
    where
        B: CameraBackend,
        T: SettleTimer,
        E: StillEncoder + ?Sized,
    {
        let mut slot = StreamSlot::new();
        slot.install(backend.acquire(StreamConstraints::VIDEO_ONLY).await?);

        let result = self.capture_once(&mut slot, timer, encoder).await;
        slot.release();

        match &result {
            Ok(image) => info!(
                width = image.width,
                height = image.height,
                "headless face capture ready"
            ),
            Err(error) => warn!(%error, "headless face capture failed"),
        }
        result
    }

    async fn capture_once<S, T, E>(
        &self,
        slot: &mut StreamSlot<S>,
        timer: &T,
        encoder: &E,
    ) -> Result<EncodedImage, CaptureError>
    where
        S: CameraStream,
        T: SettleTimer,
        E: StillEncoder + ?Sized,
    {
        let stream = slot.stream_mut().ok_or(CaptureError::NoStream)?;
        stream.wait_ready().await?;
        timer.settle(self.settle_delay).await;

        let frame = stream.grab_frame()?;
        let outcome = compress(&frame, self.target_kb, encoder)?;
        Ok(outcome.image)
    }
}

/// Reason a registration submit was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitBlocked {
    /// No still has been captured.
    #[error("Please capture your photo before registering.")]
    MissingImage,
    /// Held still exceeds the hard ceiling.
    #[error(
        "The captured image is too large. Please try capturing again with less detail or in better lighting."
    )]
    TooLarge {
        /// Estimated size in KB.
        size_kb: f64,
    },
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Camera access was denied or no camera exists.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// Capture was requested without a live stream.
    #[error("no camera stream is active")]
    NoStream,
    /// Stream failed to start or yield a frame.
    #[error("camera stream failure: {0}")]
    Stream(String),
    /// Still could not be compressed.
    #[error("photo processing failed: {0}")]
    Compress(#[from] CompressError),
    /// Frame failed model validation.
    #[error(transparent)]
    Core(#[from] faceid_core::CoreError),
}

impl CaptureError {
    /// Returns the alert text for failures of the preview capture path.
    pub fn alert_message(&self) -> &'static str {
        match self {
            CaptureError::CameraUnavailable(_) | CaptureError::NoStream => {
                CAMERA_UNAVAILABLE_ALERT
            }
            CaptureError::Stream(_) | CaptureError::Compress(_) | CaptureError::Core(_) => {
                PROCESSING_FAILED_ALERT
            }
        }
    }
}
