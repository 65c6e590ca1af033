#![warn(missing_docs)]
//! # faceid-auth
//!
//! ## Purpose
//! Implements the client-side checks that run before a login or
//! registration form is submitted, and interprets the notice the server
//! renders after a failed attempt.
//!
//! ## Responsibilities
//! - Validate usernames, passwords, and attached face images.
//! - Classify the server-rendered error notice.
//! - Describe the form payloads the server-side handlers read.
//!
//! ## Data flow
//! Page collects [`FormFields`] on submit -> [`validate_form`] returns the
//! first failing [`ValidationError`] -> caller cancels submission and shows the
//! error text to the user.
//!
//! ## Error model
//! Every [`ValidationError`] renders as the exact alert text shown to the
//! user. Checks are advisory; the server remains authoritative.
//!
//! ## Security and privacy notes
//! Validation never logs or stores credential values.
//!
//! ## Example
//! ```rust
//! use faceid_auth::{validate_password, validate_username};
//!
//! assert!(validate_username("  alice ").is_ok());
//! assert!(validate_password("Abcdef12").is_ok());
//! assert!(validate_password("abcdefgh").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum username length after trimming.
pub const MIN_USERNAME_CHARS: usize = 4;

/// Minimum password length.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Marker the server puts in its notice when face matching fails.
pub const FACE_FAILURE_MARKER: &str = "Face recognition failed";

/// Validates a username.
///
/// # Errors
/// Returns [`ValidationError::UsernameTooShort`] when fewer than four
/// characters remain after trimming. Length is counted in UTF-16 code units,
/// the way the page's input fields report it.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if utf16_len(username.trim()) < MIN_USERNAME_CHARS {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

/// Validates password strength.
///
/// A password passes when it has at least eight UTF-16 code units and
/// contains an ASCII digit, a lowercase ASCII letter, and an uppercase ASCII
/// letter.
///
/// # Errors
/// Returns [`ValidationError::WeakPassword`] otherwise.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = utf16_len(password) >= MIN_PASSWORD_CHARS;
    let has_digit = password.chars().any(|ch| ch.is_ascii_digit());
    let has_lower = password.chars().any(|ch| ch.is_ascii_lowercase());
    let has_upper = password.chars().any(|ch| ch.is_ascii_uppercase());

    if long_enough && has_digit && has_lower && has_upper {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A file chosen through a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name reported by the browser.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Validates that a face image has been attached for upload registration.
///
/// # Errors
/// Returns [`ValidationError::MissingFaceImage`] when nothing is attached or
/// the attached file is empty.
pub fn validate_face_upload(file: Option<&UploadedFile>) -> Result<(), ValidationError> {
    match file {
        Some(file) if file.size_bytes > 0 => Ok(()),
        _ => Err(ValidationError::MissingFaceImage),
    }
}

/// Field values found on a form at submit time.
///
/// `None` means the form has no such field, so the check is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    /// Value of `input[name="username"]`.
    pub username: Option<String>,
    /// Value of `input[name="password"]`.
    pub password: Option<String>,
    /// Face image file input state, when the form uploads a file.
    pub face_upload: Option<Option<UploadedFile>>,
}

/// Runs every applicable check in order: username, password, face image.
///
/// # Errors
/// Returns the first failing [`ValidationError`].
pub fn validate_form(fields: &FormFields) -> Result<(), ValidationError> {
    if let Some(username) = &fields.username {
        validate_username(username)?;
    }
    if let Some(password) = &fields.password {
        validate_password(password)?;
    }
    if let Some(upload) = &fields.face_upload {
        validate_face_upload(upload.as_ref())?;
    }
    Ok(())
}

/// Notice rendered by the server into the authentication panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerNotice {
    text: String,
}

impl ServerNotice {
    /// Builds a notice from the error paragraph text, if the page has one.
    pub fn parse(text: Option<&str>) -> Self {
        Self {
            text: text.map(|text| text.trim().to_string()).unwrap_or_default(),
        }
    }

    /// Returns `true` when the page carries a non-empty notice.
    pub fn is_present(&self) -> bool {
        !self.text.is_empty()
    }

    /// Returns `true` when the notice reports a face matching failure.
    pub fn is_face_recognition_failure(&self) -> bool {
        self.text.contains(FACE_FAILURE_MARKER)
    }

    /// Returns the trimmed notice text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Username/password login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsLogin {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl CredentialsLogin {
    /// Returns the fields this form exposes to validation.
    pub fn fields(&self) -> FormFields {
        FormFields {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            face_upload: None,
        }
    }
}

/// Face-login form, submitted automatically after a headless capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceLogin {
    /// Captured still as a JPEG data URL.
    pub webcam_image: String,
}

/// Webcam-based registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Requested username.
    pub username: String,
    /// Requested password.
    pub password: String,
    /// Captured still as a JPEG data URL; empty until a photo is taken.
    pub webcam_image: String,
}

impl Registration {
    /// Returns the fields this form exposes to validation.
    pub fn fields(&self) -> FormFields {
        FormFields {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            face_upload: None,
        }
    }
}

/// Client-side validation failure. `Display` is the user-facing alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Username shorter than four characters after trimming.
    #[error("Username must be at least 4 characters long")]
    UsernameTooShort,
    /// Password does not meet the strength rules.
    #[error("Password must be at least 8 characters and contain uppercase, lowercase, and number")]
    WeakPassword,
    /// Upload registration without an attached face image.
    #[error("Please upload a face image before registering.")]
    MissingFaceImage,
}
