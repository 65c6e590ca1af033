//! Integration tests for the page contract attribute.

use faceid_web::{PageContract, RegistrationVariant, WebError, is_register_path};

#[test]
fn page_contract_tests_defaults_match_rendered_page_ids() {
    let contract = PageContract::default();

    assert_eq!(contract.video_id, "videoElement");
    assert_eq!(contract.image_field_id, "webcamImageData");
    assert_eq!(contract.face_login_field_id, "webcam_image");
    assert_eq!(contract.home_selector, ".home");
    assert_eq!(contract.password_toggle_selector, ".pw_hide");
    assert!(contract.validate().is_ok());
}

#[test]
fn page_contract_tests_override_renames_upload_page_elements() {
    let raw = r#"{"upload_input_id":"photoFile","upload_preview_id":"photoPreview"}"#;
    let contract = PageContract::from_attribute(Some(raw)).expect("override should load");

    assert_eq!(contract.upload_input_id, "photoFile");
    assert_eq!(contract.upload_preview_id, "photoPreview");
    assert_eq!(contract.registration_form_id, "registrationForm");
}

#[test]
fn page_contract_tests_malformed_json_is_reported() {
    let error = PageContract::from_attribute(Some("{video_id:")).expect_err("should fail");
    assert!(matches!(error, WebError::ContractJson(_)));
}

#[test]
fn page_contract_tests_upload_page_uses_upload_variant() {
    assert_eq!(
        RegistrationVariant::detect(false, true),
        RegistrationVariant::Upload
    );
}

#[test]
fn page_contract_tests_register_route_detection_ignores_query() {
    assert!(is_register_path("http://localhost:5000/register"));
    assert!(!is_register_path("http://localhost:5000/login"));
    assert!(!is_register_path("http://localhost:5000/?from=register"));
}
