//! `getUserMedia` camera backend and canvas frame grabbing.

use std::time::Duration;

use faceid_capture::{CameraBackend, CameraStream, CaptureError, SettleTimer, StreamConstraints};
use faceid_core::Frame;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::WebError;

const HAVE_METADATA: u16 = 1;

/// Camera that renders into a `<video>` and grabs through a `<canvas>`.
#[derive(Debug, Clone)]
pub(super) struct BrowserCamera {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
}

impl BrowserCamera {
    /// Uses the page's preview video and canvas.
    pub(super) fn attached(video: HtmlVideoElement, canvas: HtmlCanvasElement) -> Self {
        Self { video, canvas }
    }

    /// Uses detached elements that are never inserted into the page.
    pub(super) fn detached(document: &Document) -> Result<Self, WebError> {
        let video = create::<HtmlVideoElement>(document, "video")?;
        let canvas = create::<HtmlCanvasElement>(document, "canvas")?;
        Ok(Self { video, canvas })
    }
}

impl CameraBackend for BrowserCamera {
    type Stream = BrowserStream;

    async fn acquire(&self, constraints: StreamConstraints) -> Result<BrowserStream, CaptureError> {
        let window = web_sys::window()
            .ok_or_else(|| CaptureError::CameraUnavailable("window is unavailable".to_string()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|error| CaptureError::CameraUnavailable(js_message(&error)))?;

        let request = MediaStreamConstraints::new();
        request.set_video(&JsValue::from_bool(constraints.video));
        request.set_audio(&JsValue::from_bool(constraints.audio));

        let promise = devices
            .get_user_media_with_constraints(&request)
            .map_err(|error| CaptureError::CameraUnavailable(js_message(&error)))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|error| CaptureError::CameraUnavailable(js_message(&error)))?
            .dyn_into::<MediaStream>()
            .map_err(|_| CaptureError::CameraUnavailable("not a media stream".to_string()))?;

        self.video.set_autoplay(true);
        self.video.set_muted(true);
        self.video.set_src_object(Some(&stream));

        Ok(BrowserStream {
            stream,
            video: self.video.clone(),
            canvas: self.canvas.clone(),
        })
    }
}

/// Live `MediaStream` bound to its video element.
#[derive(Debug)]
pub(super) struct BrowserStream {
    stream: MediaStream,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
}

impl CameraStream for BrowserStream {
    fn track_count(&self) -> usize {
        self.stream.get_tracks().length() as usize
    }

    fn stop_all_tracks(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        self.video.set_src_object(None);
    }

    async fn wait_ready(&mut self) -> Result<(), CaptureError> {
        if self.video.ready_state() < HAVE_METADATA {
            let video = self.video.clone();
            let loaded = Promise::new(&mut |resolve, _reject| {
                video.set_onloadedmetadata(Some(&resolve));
            });
            JsFuture::from(loaded)
                .await
                .map_err(|error| CaptureError::Stream(js_message(&error)))?;
            self.video.set_onloadedmetadata(None);
        }

        let playing = self
            .video
            .play()
            .map_err(|error| CaptureError::Stream(js_message(&error)))?;
        JsFuture::from(playing)
            .await
            .map_err(|error| CaptureError::Stream(js_message(&error)))?;
        Ok(())
    }

    fn grab_frame(&self) -> Result<Frame, CaptureError> {
        let width = self.video.video_width();
        let height = self.video.video_height();
        if width == 0 || height == 0 {
            return Err(CaptureError::Stream("video has no frame yet".to_string()));
        }

        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let context = self
            .canvas
            .get_context("2d")
            .map_err(|error| CaptureError::Stream(js_message(&error)))?
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| CaptureError::Stream("2d context unavailable".to_string()))?;

        context
            .draw_image_with_html_video_element_and_dw_and_dh(
                &self.video,
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            )
            .map_err(|error| CaptureError::Stream(js_message(&error)))?;
        let pixels = context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|error| CaptureError::Stream(js_message(&error)))?;

        Ok(Frame::new(width, height, pixels.data().0)?)
    }
}

/// Settle timer backed by `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct GlooSettleTimer;

impl SettleTimer for GlooSettleTimer {
    async fn settle(&self, delay: Duration) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, WebError> {
    document
        .create_element(tag)
        .map_err(|error| WebError::Dom(js_message(&error)))?
        .dyn_into::<T>()
        .map_err(|_| WebError::Dom(format!("<{tag}> has an unexpected type")))
}

/// Extracts a readable message from a thrown JS value.
pub(super) fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
