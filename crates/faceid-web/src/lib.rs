#![warn(missing_docs)]
//! # faceid-web
//!
//! ## Purpose
//! Wires the capture controller and the UI controller onto the server-rendered
//! login/registration page.
//!
//! ## Responsibilities
//! - Describe the element-ID contract the page exposes ([`PageContract`]).
//! - Decide whether a form submit may proceed ([`SubmitDecision`]).
//! - Forward `tracing` events to the browser console ([`ConsoleLayer`]).
//! - On `wasm32`, attach DOM listeners through `web-sys`.
//!
//! ## Data flow
//! Page load -> contract read from `<body data-faceid-contract>` -> UI
//! controller and capture controller attach independently -> DOM events drive
//! `faceid-ui` reducers and the `faceid-capture` controller -> results are
//! rendered back onto elements.
//!
//! ## Ownership and lifetimes
//! Each controller is owned by the listeners that drive it (`Rc<RefCell<_>>`
//! on the single browser thread). The camera stream lives in the capture
//! controller and is released by the `beforeunload` listener.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`WebError`]. User-facing failures are
//! shown as blocking alerts; the window `error` listener only logs.
//!
//! ## Security and privacy notes
//! Log lines pass through [`redact_sensitive`] so credentials and image
//! payloads never reach the console.

mod contract;
mod logging;
mod setup;
mod submit;

#[cfg(target_arch = "wasm32")]
mod browser;

use faceid_auth::ValidationError;
use faceid_capture::CaptureError;
use thiserror::Error;
use url::Url;

pub use contract::{CONTRACT_ATTRIBUTE, PageContract, RegistrationVariant};
pub use logging::{CONSOLE_LEVEL, ConsoleLayer, ConsoleSink, init_logging};
pub use setup::{SetupStep, run_setup_steps};
pub use submit::{SubmitDecision, decide_form_submit, decide_photo_submit};

/// Build-time version loaded from the root `VERSION` file.
pub const APP_VERSION: &str = env!("FACEID_VERSION");

/// Returns the version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Returns `true` when `href` points at the registration route.
///
/// Unparseable locations are treated as not registration.
pub fn is_register_path(href: &str) -> bool {
    Url::parse(href)
        .map(|url| url.path().contains("register"))
        .unwrap_or(false)
}

/// Redacts credentials and image payloads in log-safe output.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for key in ["password", "webcam_image", "token", "authorization"] {
        redacted = redact_key_value(&redacted, key);
    }
    redact_data_urls(&redacted)
}

/// Redacts everything after the first `key=` or `key:` pair.
///
/// The key must stand alone, so `WeakPassword` or `password_hint` are kept.
fn redact_key_value(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut from = 0;
    while let Some(offset) = lower[from..].find(key) {
        let start = from + offset;
        let separator = start + key.len();
        let standalone = start == 0 || !is_key_byte(bytes[start - 1]);
        if standalone && matches!(bytes.get(separator), Some(b'=' | b':')) {
            return format!("{}<redacted>", &input[..=separator]);
        }
        from = separator;
    }

    input.to_string()
}

fn is_key_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn redact_data_urls(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("data:") {
        output.push_str(&rest[..start]);
        output.push_str("data:<redacted>");
        let tail = &rest[start..];
        let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        rest = &tail[end..];
    }
    output.push_str(rest);
    output
}

/// Page integration error type.
#[derive(Debug, Error)]
pub enum WebError {
    /// Contract JSON could not be parsed.
    #[error("page contract is not valid json: {0}")]
    ContractJson(#[from] serde_json::Error),
    /// Contract parsed but is unusable.
    #[error("invalid page contract: {0}")]
    InvalidContract(String),
    /// Capture subsystem error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Client-side validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Logging subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// DOM lookup or manipulation failed.
    #[error("dom error: {0}")]
    Dom(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for location and redaction helpers.

    use super::*;

    #[test]
    fn register_path_is_detected_from_href() {
        assert!(is_register_path("https://example.test/register/"));
        assert!(!is_register_path("https://example.test/login/?next=register"));
        assert!(!is_register_path("not a url"));
    }

    #[test]
    fn key_redaction_needs_a_standalone_key_and_separator() {
        assert_eq!(
            redact_key_value("reason=WeakPassword", "password"),
            "reason=WeakPassword"
        );
        assert_eq!(
            redact_key_value("password_hint=x password: hunter2", "password"),
            "password_hint=x password:<redacted>"
        );
        assert_eq!(redact_key_value("Token=abc", "token"), "Token=<redacted>");
    }

    #[test]
    fn data_urls_are_redacted_in_place() {
        let line = "captured data:image/jpeg;base64,AAAABBBB ok";
        assert_eq!(redact_data_urls(line), "captured data:<redacted> ok");
    }
}
