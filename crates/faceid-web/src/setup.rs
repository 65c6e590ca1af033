//! Page setup that keeps going when one step fails.

use tracing::error;

use crate::WebError;

/// One named piece of page setup.
pub struct SetupStep<'a> {
    name: &'static str,
    run: Box<dyn FnOnce() -> Result<(), WebError> + 'a>,
}

impl<'a> SetupStep<'a> {
    /// Wraps `run` under `name`, which is logged if it fails.
    pub fn new(name: &'static str, run: impl FnOnce() -> Result<(), WebError> + 'a) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }

    /// Returns the step name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for SetupStep<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupStep").field("name", &self.name).finish()
    }
}

/// Runs every step in order and returns how many failed.
///
/// A failure is logged and the remaining steps still run.
pub fn run_setup_steps<'a>(steps: impl IntoIterator<Item = SetupStep<'a>>) -> usize {
    let mut failed = 0;
    for step in steps {
        if let Err(setup_error) = (step.run)() {
            error!(step = step.name, error = %setup_error, "page setup step failed");
            failed += 1;
        }
    }
    failed
}
