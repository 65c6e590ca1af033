#![warn(missing_docs)]
//! # faceid-ui
//!
//! ## Purpose
//! Defines the UI-facing state model of the login/registration page.
//!
//! ## Responsibilities
//! - Represent the slide-in panel visibility and login/signup mode.
//! - Keep password masking and its eye icon in lockstep.
//! - Track the face-login button label and the capture widget visibility.
//! - Apply pre-population rules from the server-rendered notice.
//!
//! ## Data flow
//! DOM events call methods on [`PageState`] and its parts; the browser layer
//! renders the resulting flags back onto elements (`show`, `active`,
//! `style.display`, input `type`, icon classes, button text).
//!
//! ## Ownership and lifetimes
//! All state is owned plain data, so reducers are trivially testable without
//! a DOM.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Every transition
//! is total and idempotent where the page expects it to be.

use faceid_auth::ServerNotice;
use tracing::debug;

/// Visibility flags of the authentication panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    /// Container-level `show` class on `.home`.
    pub shown: bool,
    /// Inner-panel `active` class on `.form_container` (signup mode).
    pub active: bool,
}

impl PanelState {
    /// Reads the state from the `class` attributes the server rendered.
    pub fn from_rendered(home_class: &str, container_class: &str) -> Self {
        let has = |classes: &str, wanted: &str| classes.split_whitespace().any(|c| c == wanted);
        Self {
            shown: has(home_class, "show"),
            active: has(container_class, "active"),
        }
    }

    /// Opens the panel.
    pub fn open(&mut self) {
        self.shown = true;
        self.active = true;
    }

    /// Closes the panel.
    pub fn close(&mut self) {
        self.shown = false;
        self.active = false;
    }

    /// Switches the panel to signup mode.
    pub fn switch_to_signup(&mut self) {
        self.active = true;
    }

    /// Switches the panel to login mode.
    pub fn switch_to_login(&mut self) {
        self.active = false;
    }
}

/// Eye icon class shown next to a password input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconClass {
    /// Crossed-out eye (`uil-eye-slash`), shown while masked.
    EyeSlash,
    /// Open eye (`uil-eye`), shown while revealed.
    Eye,
}

impl IconClass {
    /// Returns the CSS class name.
    pub fn css_class(self) -> &'static str {
        match self {
            IconClass::EyeSlash => "uil-eye-slash",
            IconClass::Eye => "uil-eye",
        }
    }

    fn flipped(self) -> Self {
        match self {
            IconClass::EyeSlash => IconClass::Eye,
            IconClass::Eye => IconClass::EyeSlash,
        }
    }
}

/// A password input paired with its visibility icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordField {
    masked: bool,
    icon: IconClass,
}

impl PasswordField {
    /// Creates a masked field with a crossed-out eye.
    pub fn new() -> Self {
        Self {
            masked: true,
            icon: IconClass::EyeSlash,
        }
    }

    /// Adopts the state currently rendered on the page.
    pub fn from_rendered(input_type: &str, icon: IconClass) -> Self {
        Self {
            masked: input_type == "password",
            icon,
        }
    }

    /// Flips masking and the icon together.
    pub fn toggle(&mut self) {
        self.masked = !self.masked;
        self.icon = self.icon.flipped();
    }

    /// Returns `true` while the input hides its value.
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// Returns the input `type` attribute to render.
    pub fn input_type(&self) -> &'static str {
        if self.masked { "password" } else { "text" }
    }

    /// Returns the icon to render.
    pub fn icon(&self) -> IconClass {
        self.icon
    }
}

impl Default for PasswordField {
    fn default() -> Self {
        Self::new()
    }
}

/// Label state of the face-login trigger button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaceButton {
    /// Ready for a first attempt.
    #[default]
    Idle,
    /// Ready for another attempt after a server-side match failure.
    Retry,
    /// Capture in progress; the button is disabled.
    Scanning,
}

impl FaceButton {
    /// Returns the button text.
    pub fn label(self) -> &'static str {
        match self {
            FaceButton::Idle => "Login with Face ID",
            FaceButton::Retry => "Re-take Face ID",
            FaceButton::Scanning => "Scanning...",
        }
    }

    /// Returns `true` when the button accepts clicks.
    pub fn is_enabled(self) -> bool {
        self != FaceButton::Scanning
    }

    /// Enters the scanning state.
    pub fn begin_scan(&mut self) {
        *self = FaceButton::Scanning;
    }

    /// Returns to the idle label after a failed headless capture.
    pub fn reset(&mut self) {
        *self = FaceButton::Idle;
    }
}

/// Visibility of the webcam capture widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureView {
    /// Live preview `<video>`.
    pub video_visible: bool,
    /// Capture button.
    pub capture_visible: bool,
    /// Retake button.
    pub retake_visible: bool,
    /// Captured still `<img>`.
    pub captured_visible: bool,
}

impl CaptureView {
    /// Pre-capture layout: live preview and capture button.
    pub fn pristine() -> Self {
        Self {
            video_visible: true,
            capture_visible: true,
            retake_visible: false,
            captured_visible: false,
        }
    }

    /// Post-capture layout: captured still and retake button.
    pub fn captured() -> Self {
        Self {
            video_visible: false,
            capture_visible: false,
            retake_visible: true,
            captured_visible: true,
        }
    }
}

impl Default for CaptureView {
    fn default() -> Self {
        Self::pristine()
    }
}

/// Inline preview of a file chosen for upload registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPreview {
    source: Option<String>,
}

impl UploadPreview {
    /// Shows `data_url` as the preview.
    pub fn show(&mut self, data_url: impl Into<String>) {
        self.source = Some(data_url.into());
    }

    /// Returns the preview source, if a file was read.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns `true` once a preview is available.
    pub fn is_visible(&self) -> bool {
        self.source.is_some()
    }
}

/// Facts about the page gathered once at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    /// Panel classes present in the markup before any script ran.
    pub rendered_panel: PanelState,
    /// Server-rendered notice inside the panel.
    pub notice: ServerNotice,
    /// Page contains a signup form.
    pub has_signup_form: bool,
    /// Location path mentions the registration route.
    pub on_register_path: bool,
}

/// Aggregate UI state of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    /// Panel visibility.
    pub panel: PanelState,
    /// Face-login trigger label.
    pub face_button: FaceButton,
    /// Upload preview for file-based registration.
    pub upload_preview: UploadPreview,
}

impl PageState {
    /// Builds the initial state from load-time facts.
    ///
    /// Starts from the rendered panel classes. A non-empty notice forces the panel open, a face matching failure
    /// switches the face button to its retry label, and the registration page
    /// shows the panel container.
    pub fn bootstrap(facts: &PageFacts) -> Self {
        let mut state = Self {
            panel: facts.rendered_panel,
            ..Self::default()
        };

        if facts.notice.is_present() {
            debug!("server notice present; opening panel");
            state.panel.open();
            if facts.notice.is_face_recognition_failure() {
                state.face_button = FaceButton::Retry;
            }
        }

        if facts.has_signup_form && facts.on_register_path {
            state.panel.shown = true;
        }

        state
    }
}
