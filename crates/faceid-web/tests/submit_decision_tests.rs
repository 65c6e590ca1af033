//! Integration tests for page-level submit decisions.

use faceid_auth::{FormFields, UploadedFile};
use faceid_capture::{CaptureController, SyntheticCamera};
use faceid_compress::{CompressError, JpegStillEncoder, Quality, StillEncoder};
use faceid_core::{EncodedImage, Frame, JPEG_DATA_URL_PREFIX};
use faceid_ui::CaptureView;
use faceid_web::{SubmitDecision, decide_form_submit, decide_photo_submit};
use futures::executor::block_on;

/// Encoder producing a payload well above the submit ceiling.
struct OversizedEncoder;

impl StillEncoder for OversizedEncoder {
    fn encode(&self, frame: &Frame, quality: Quality) -> Result<EncodedImage, CompressError> {
        Ok(EncodedImage::from_data_url(
            format!("{JPEG_DATA_URL_PREFIX}{}", "A".repeat(1_500_000)),
            frame.width,
            frame.height,
            quality.as_fraction(),
        )?)
    }
}

fn fields(username: &str, password: &str) -> FormFields {
    FormFields {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        face_upload: None,
    }
}

#[test]
fn submit_decision_tests_short_username_blocks_with_alert() {
    let decision = decide_form_submit(&fields("abc", "Passw0rdX"));

    assert_eq!(
        decision.alert(),
        Some("Username must be at least 4 characters long")
    );
}

#[test]
fn submit_decision_tests_weak_password_blocks_with_alert() {
    let decision = decide_form_submit(&fields("alice", "password1"));

    assert_eq!(
        decision.alert(),
        Some("Password must be at least 8 characters and contain uppercase, lowercase, and number")
    );
}

#[test]
fn submit_decision_tests_valid_credentials_are_allowed() {
    assert!(decide_form_submit(&fields("  alice  ", "Passw0rdX")).is_allowed());
}

#[test]
fn submit_decision_tests_face_login_form_without_fields_is_allowed() {
    assert_eq!(
        decide_form_submit(&FormFields::default()),
        SubmitDecision::Allow
    );
}

#[test]
fn submit_decision_tests_upload_form_requires_a_file() {
    let mut form = fields("alice", "Passw0rdX");
    form.face_upload = Some(None);
    assert!(!decide_form_submit(&form).is_allowed());

    form.face_upload = Some(Some(UploadedFile {
        name: "me.jpg".to_string(),
        size_bytes: 20_480,
    }));
    assert!(decide_form_submit(&form).is_allowed());
}

#[test]
fn submit_decision_tests_missing_photo_blocks_without_retake() {
    let mut controller = CaptureController::new(JpegStillEncoder);
    block_on(controller.acquire(&SyntheticCamera::new(64, 48))).expect("camera granted");

    assert_eq!(
        decide_photo_submit(&mut controller),
        SubmitDecision::Block {
            alert: "Please capture your photo before registering.".to_string(),
            force_retake: false,
        }
    );
}

#[test]
fn submit_decision_tests_oversized_photo_forces_retake() {
    let mut controller = CaptureController::new(OversizedEncoder);
    block_on(controller.acquire(&SyntheticCamera::new(64, 48))).expect("camera granted");
    controller.capture().expect("capture should succeed");

    let decision = decide_photo_submit(&mut controller);

    assert!(matches!(
        decision,
        SubmitDecision::Block {
            force_retake: true,
            ..
        }
    ));
    assert_eq!(controller.view(), CaptureView::pristine());
    assert!(controller.field_value().is_empty());
}

#[test]
fn submit_decision_tests_captured_photo_is_allowed() {
    let mut controller = CaptureController::new(JpegStillEncoder);
    block_on(controller.acquire(&SyntheticCamera::new(320, 240))).expect("camera granted");
    controller.capture().expect("capture should succeed");

    assert!(decide_photo_submit(&mut controller).is_allowed());
}
