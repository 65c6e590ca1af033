//! Submit-time decisions shared by every form on the page.

use faceid_auth::{FormFields, validate_form};
use faceid_capture::{CameraStream, CaptureController, SubmitBlocked};
use faceid_compress::StillEncoder;
use tracing::info;

/// Outcome of a submit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Let the browser submit the form.
    Allow,
    /// Cancel the submit and alert the user.
    Block {
        /// Alert text.
        alert: String,
        /// The capture widget was reset and must be re-rendered.
        force_retake: bool,
    },
}

impl SubmitDecision {
    /// Returns `true` when the submit may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, SubmitDecision::Allow)
    }

    /// Returns the alert text of a blocked submit.
    pub fn alert(&self) -> Option<&str> {
        match self {
            SubmitDecision::Allow => None,
            SubmitDecision::Block { alert, .. } => Some(alert),
        }
    }
}

/// Runs the field checks that apply to any form.
pub fn decide_form_submit(fields: &FormFields) -> SubmitDecision {
    match validate_form(fields) {
        Ok(()) => SubmitDecision::Allow,
        Err(error) => {
            info!(reason = ?error, "form submit blocked by validation");
            SubmitDecision::Block {
                alert: error.to_string(),
                force_retake: false,
            }
        }
    }
}

/// Runs the photo guard of the webcam registration form.
///
/// An oversized photo also resets the capture widget.
pub fn decide_photo_submit<S, E>(controller: &mut CaptureController<S, E>) -> SubmitDecision
where
    S: CameraStream,
    E: StillEncoder,
{
    match controller.submit_guard() {
        Ok(()) => SubmitDecision::Allow,
        Err(blocked) => {
            let force_retake = matches!(blocked, SubmitBlocked::TooLarge { .. });
            info!(force_retake, "registration submit blocked by photo guard");
            SubmitDecision::Block {
                alert: blocked.to_string(),
                force_retake,
            }
        }
    }
}
