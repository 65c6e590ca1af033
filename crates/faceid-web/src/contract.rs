//! Element-ID contract between the server-rendered page and the scripts.
//!
//! One contract replaces per-page script copies: a page overrides only the
//! identifiers that differ from the defaults.

use serde::{Deserialize, Serialize};

use crate::WebError;

/// `<body>` attribute carrying a JSON contract override.
pub const CONTRACT_ATTRIBUTE: &str = "data-faceid-contract";

/// Identifiers and selectors of every element the scripts touch.
///
/// Missing elements disable only the feature that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageContract {
    /// Live preview `<video>`.
    pub video_id: String,
    /// Drawing surface used to grab preview frames.
    pub canvas_id: String,
    /// Capture button.
    pub capture_button_id: String,
    /// Retake button.
    pub retake_button_id: String,
    /// Captured still `<img>`.
    pub captured_image_id: String,
    /// Hidden field receiving the registration photo.
    pub image_field_id: String,
    /// Webcam registration form.
    pub registration_form_id: String,
    /// Face-login form.
    pub face_login_form_id: String,
    /// Hidden field receiving the face-login photo.
    pub face_login_field_id: String,
    /// File input of upload-based registration.
    pub upload_input_id: String,
    /// Preview `<img>` of upload-based registration.
    pub upload_preview_id: String,
    /// Panel container receiving the `show` class.
    pub home_selector: String,
    /// Inner panel receiving the `active` class.
    pub form_container_selector: String,
    /// Panel close button.
    pub form_close_selector: String,
    /// Password visibility icons.
    pub password_toggle_selector: String,
    /// Switch-to-signup link.
    pub signup_selector: String,
    /// Switch-to-login link.
    pub login_selector: String,
    /// Panel open button.
    pub form_open_selector: String,
    /// Signup form marker used to detect the registration page.
    pub signup_form_selector: String,
    /// Server-rendered error paragraph.
    pub error_notice_selector: String,
    /// Registration submit button gated on a captured photo.
    pub submit_button_selector: String,
}

impl Default for PageContract {
    fn default() -> Self {
        Self {
            video_id: "videoElement".to_string(),
            canvas_id: "canvas".to_string(),
            capture_button_id: "captureBtn".to_string(),
            retake_button_id: "retakeBtn".to_string(),
            captured_image_id: "capturedImage".to_string(),
            image_field_id: "webcamImageData".to_string(),
            registration_form_id: "registrationForm".to_string(),
            face_login_form_id: "faceLoginForm".to_string(),
            face_login_field_id: "webcam_image".to_string(),
            upload_input_id: "faceImageUpload".to_string(),
            upload_preview_id: "imagePreview".to_string(),
            home_selector: ".home".to_string(),
            form_container_selector: ".form_container".to_string(),
            form_close_selector: ".form_close".to_string(),
            password_toggle_selector: ".pw_hide".to_string(),
            signup_selector: "#signup".to_string(),
            login_selector: "#login".to_string(),
            form_open_selector: "#form-open".to_string(),
            signup_form_selector: ".signup_form".to_string(),
            error_notice_selector: ".form_container p[style*='color: red']".to_string(),
            submit_button_selector: "button[type=\"submit\"]".to_string(),
        }
    }
}

impl PageContract {
    /// Builds a contract from the optional `data-faceid-contract` JSON.
    ///
    /// Absent or blank input yields the defaults; present keys override them.
    ///
    /// # Errors
    /// Returns [`WebError::ContractJson`] for malformed JSON or unknown keys
    /// and [`WebError::InvalidContract`] for empty identifiers.
    pub fn from_attribute(raw: Option<&str>) -> Result<Self, WebError> {
        let contract = match raw.map(str::trim) {
            None | Some("") => Self::default(),
            Some(json) => serde_json::from_str(json)?,
        };
        contract.validate()?;
        Ok(contract)
    }

    /// Checks that every identifier is non-empty.
    ///
    /// # Errors
    /// Returns [`WebError::InvalidContract`] naming the first empty field.
    pub fn validate(&self) -> Result<(), WebError> {
        let fields = [
            ("video_id", &self.video_id),
            ("canvas_id", &self.canvas_id),
            ("capture_button_id", &self.capture_button_id),
            ("retake_button_id", &self.retake_button_id),
            ("captured_image_id", &self.captured_image_id),
            ("image_field_id", &self.image_field_id),
            ("registration_form_id", &self.registration_form_id),
            ("face_login_form_id", &self.face_login_form_id),
            ("face_login_field_id", &self.face_login_field_id),
            ("upload_input_id", &self.upload_input_id),
            ("upload_preview_id", &self.upload_preview_id),
            ("home_selector", &self.home_selector),
            ("form_container_selector", &self.form_container_selector),
            ("form_close_selector", &self.form_close_selector),
            ("password_toggle_selector", &self.password_toggle_selector),
            ("signup_selector", &self.signup_selector),
            ("login_selector", &self.login_selector),
            ("form_open_selector", &self.form_open_selector),
            ("signup_form_selector", &self.signup_form_selector),
            ("error_notice_selector", &self.error_notice_selector),
            ("submit_button_selector", &self.submit_button_selector),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(WebError::InvalidContract(format!("{name} is empty"))),
            None => Ok(()),
        }
    }
}

/// How the registration form on a page obtains the face photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationVariant {
    /// Live webcam capture into a hidden field.
    Webcam,
    /// File input with inline preview.
    Upload,
    /// Page has no registration photo at all.
    Absent,
}

impl RegistrationVariant {
    /// Picks the variant from which contract elements exist on the page.
    ///
    /// A page carrying both prefers the webcam flow.
    pub fn detect(has_image_field: bool, has_upload_input: bool) -> Self {
        match (has_image_field, has_upload_input) {
            (true, _) => RegistrationVariant::Webcam,
            (false, true) => RegistrationVariant::Upload,
            (false, false) => RegistrationVariant::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for contract loading.

    use super::*;

    #[test]
    fn absent_attribute_yields_defaults() {
        let contract = PageContract::from_attribute(None).expect("defaults should load");
        assert_eq!(contract, PageContract::default());
        assert_eq!(
            PageContract::from_attribute(Some("  ")).expect("blank should load"),
            contract
        );
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let contract = PageContract::from_attribute(Some(r#"{"video_id":"cam"}"#))
            .expect("override should load");
        assert_eq!(contract.video_id, "cam");
        assert_eq!(contract.capture_button_id, "captureBtn");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let error = PageContract::from_attribute(Some(r#"{"canvas_id":""}"#))
            .expect_err("empty id should fail");
        assert!(error.to_string().contains("canvas_id"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            PageContract::from_attribute(Some(r#"{"videoId":"cam"}"#)),
            Err(WebError::ContractJson(_))
        ));
    }

    #[test]
    fn webcam_variant_wins_over_upload() {
        assert_eq!(RegistrationVariant::detect(true, true), RegistrationVariant::Webcam);
        assert_eq!(RegistrationVariant::detect(false, true), RegistrationVariant::Upload);
        assert_eq!(RegistrationVariant::detect(false, false), RegistrationVariant::Absent);
    }
}
