//! Webcam registration widget and headless face login.

use std::cell::RefCell;
use std::rc::Rc;

use faceid_capture::{
    CameraBackend, CameraStream, CaptureController, HEADLESS_FAILURE_ALERT, HeadlessLogin,
    StreamConstraints,
};
use faceid_compress::JpegStillEncoder;
use faceid_core::EncodedImage;
use faceid_ui::FaceButton;
use tracing::{debug, error, info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Event, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlFormElement,
    HtmlImageElement, HtmlInputElement, HtmlVideoElement,
};

use super::camera::{BrowserCamera, BrowserStream, GlooSettleTimer};
use super::dom;
use super::ui_page::render_face_button;
use crate::{
    PageContract, RegistrationVariant, SetupStep, SubmitDecision, WebError, decide_photo_submit,
    run_setup_steps,
};

/// Capture controller plus the elements it renders onto.
struct CaptureWidget {
    controller: CaptureController<BrowserStream, JpegStillEncoder>,
    video: HtmlVideoElement,
    capture_button: Option<HtmlElement>,
    retake_button: Option<HtmlElement>,
    captured_image: Option<HtmlImageElement>,
    field: HtmlInputElement,
    submit_button: Option<HtmlButtonElement>,
}

impl CaptureWidget {
    fn render(&self) {
        let view = self.controller.view();
        dom::set_visible(&self.video, view.video_visible, "block");
        if let Some(button) = &self.capture_button {
            dom::set_visible(button, view.capture_visible, "inline-block");
        }
        if let Some(button) = &self.retake_button {
            dom::set_visible(button, view.retake_visible, "inline-block");
        }
        if let Some(image) = &self.captured_image {
            if let Some(held) = self.controller.held() {
                image.set_src(held.data_url());
            }
            dom::set_visible(image, view.captured_visible, "block");
        }

        self.field.set_value(self.controller.field_value());
        if let Some(button) = &self.submit_button {
            button.set_disabled(!self.controller.submit_enabled());
        }
    }
}

/// Attaches the capture widget and the face-login trigger when present.
///
/// Each part attaches on its own; a failing widget leaves face login working.
pub(super) fn attach(document: &Document, contract: &PageContract) {
    let field = dom::by_id::<HtmlInputElement>(document, &contract.image_field_id);
    let variant = RegistrationVariant::detect(
        field.is_some(),
        dom::by_id::<HtmlInputElement>(document, &contract.upload_input_id).is_some(),
    );
    debug!(?variant, "registration variant detected");

    let preview = (
        field,
        dom::by_id::<HtmlVideoElement>(document, &contract.video_id),
        dom::by_id::<HtmlCanvasElement>(document, &contract.canvas_id),
    );
    let mut steps = Vec::with_capacity(2);
    if variant == RegistrationVariant::Webcam
        && let (Some(field), Some(video), Some(canvas)) = preview
    {
        steps.push(SetupStep::new("capture widget", move || {
            attach_widget(document, contract, field, video, canvas)
        }));
    }
    steps.push(SetupStep::new("face login", move || {
        attach_face_login(document, contract)
    }));
    run_setup_steps(steps);
}

fn attach_widget(
    document: &Document,
    contract: &PageContract,
    field: HtmlInputElement,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
) -> Result<(), WebError> {
    let form = dom::by_id::<HtmlFormElement>(document, &contract.registration_form_id);
    let submit_button = form
        .as_ref()
        .and_then(|form| dom::query(form, &contract.submit_button_selector))
        .or_else(|| dom::query_document(document, &contract.submit_button_selector));

    let camera = BrowserCamera::attached(video.clone(), canvas);
    let widget = Rc::new(RefCell::new(CaptureWidget {
        controller: CaptureController::new(JpegStillEncoder),
        video,
        capture_button: dom::by_id(document, &contract.capture_button_id),
        retake_button: dom::by_id(document, &contract.retake_button_id),
        captured_image: dom::by_id(document, &contract.captured_image_id),
        field,
        submit_button,
    }));
    widget.borrow().render();

    start_preview(camera, Rc::clone(&widget));

    if let Some(button) = dom::by_id::<HtmlElement>(document, &contract.capture_button_id) {
        let widget = Rc::clone(&widget);
        dom::listen(&button, "click", move |_event: Event| {
            let mut widget = widget.borrow_mut();
            if let Err(capture_error) = widget.controller.capture() {
                error!(error = %capture_error, "photo capture failed");
                dom::alert(capture_error.alert_message());
            }
            widget.render();
        })?;
    }

    if let Some(button) = dom::by_id::<HtmlElement>(document, &contract.retake_button_id) {
        let widget = Rc::clone(&widget);
        dom::listen(&button, "click", move |_event: Event| {
            let mut widget = widget.borrow_mut();
            widget.controller.retake();
            widget.render();
        })?;
    }

    if let Some(form) = form {
        let widget = Rc::clone(&widget);
        dom::listen(&form, "submit", move |event: Event| {
            // Field validation already refused this submit and alerted.
            if event.default_prevented() {
                return;
            }
            let mut widget = widget.borrow_mut();
            if let SubmitDecision::Block {
                alert,
                force_retake,
            } = decide_photo_submit(&mut widget.controller)
            {
                event.prevent_default();
                dom::alert(&alert);
                if force_retake {
                    widget.render();
                }
            }
        })?;
    }

    dom::listen(&dom::window()?, "beforeunload", move |_event: Event| {
        if widget.borrow_mut().controller.dispose() {
            debug!("camera stream released on unload");
        }
    })
}

fn start_preview(camera: BrowserCamera, widget: Rc<RefCell<CaptureWidget>>) {
    spawn_local(async move {
        match camera.acquire(StreamConstraints::VIDEO_ONLY).await {
            Ok(stream) => {
                info!(tracks = stream.track_count(), "camera stream acquired");
                widget.borrow_mut().controller.replace_stream(stream);
            }
            Err(capture_error) => {
                warn!(error = %capture_error, "camera access failed");
                dom::alert(capture_error.alert_message());
            }
        }
    });
}

fn attach_face_login(document: &Document, contract: &PageContract) -> Result<(), WebError> {
    let Some(form) = dom::by_id::<HtmlFormElement>(document, &contract.face_login_form_id) else {
        return Ok(());
    };
    let Some(button) = dom::query::<HtmlButtonElement>(&form, "button") else {
        return Ok(());
    };
    let field = dom::by_id::<HtmlInputElement>(document, &contract.face_login_field_id);
    let document = document.clone();
    let trigger = button.clone();

    dom::listen(&button, "click", move |event: Event| {
        event.prevent_default();
        let mut state = FaceButton::Idle;
        state.begin_scan();
        render_face_button(&trigger, state);

        let (document, form, field, trigger) =
            (document.clone(), form.clone(), field.clone(), trigger.clone());
        spawn_local(async move {
            match headless_capture(&document).await {
                Ok(image) => {
                    if let Some(field) = &field {
                        field.set_value(image.data_url());
                    }
                    if form.submit().is_err() {
                        warn!("face login form could not be submitted");
                    }
                }
                Err(capture_error) => {
                    error!(error = %capture_error, "face login capture failed");
                    dom::alert(HEADLESS_FAILURE_ALERT);
                    state.reset();
                    render_face_button(&trigger, state);
                }
            }
        });
    })
}

async fn headless_capture(document: &Document) -> Result<EncodedImage, WebError> {
    let camera = BrowserCamera::detached(document)?;
    let image = HeadlessLogin::default()
        .run(&camera, &GlooSettleTimer, &JpegStillEncoder)
        .await?;
    Ok(image)
}
