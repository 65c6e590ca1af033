//! Browser binding: boots the page controllers through `web-sys`.

mod camera;
mod capture_page;
mod dom;
mod ui_page;

use tracing::{Level, error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{ErrorEvent, Event};

use crate::{
    CONSOLE_LEVEL, CONTRACT_ATTRIBUTE, ConsoleSink, PageContract, SetupStep, WebError,
    app_version, init_logging, run_setup_steps,
};

/// Sink writing to the browser developer console.
struct BrowserConsole;

impl ConsoleSink for BrowserConsole {
    fn write(&self, level: Level, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

/// Module entrypoint invoked by the generated JS glue.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(setup_error) = init_logging(BrowserConsole, CONSOLE_LEVEL) {
        web_sys::console::warn_1(&JsValue::from_str(&setup_error.to_string()));
    }

    boot().map_err(|boot_error| JsValue::from_str(&boot_error.to_string()))
}

fn boot() -> Result<(), WebError> {
    attach_error_logging()?;

    let document = dom::document()?;
    if document.ready_state() == "loading" {
        dom::listen(&document, "DOMContentLoaded", |_event: Event| {
            if let Err(setup_error) = attach_page() {
                error!(error = %setup_error, "page setup failed");
            }
        })
    } else {
        attach_page()
    }
}

fn attach_page() -> Result<(), WebError> {
    let document = dom::document()?;
    let raw = document
        .body()
        .and_then(|body| body.get_attribute(CONTRACT_ATTRIBUTE));
    let contract = PageContract::from_attribute(raw.as_deref())?;
    info!(version = app_version(), "faceid page starting");

    run_setup_steps([
        SetupStep::new("ui controller", || ui_page::attach(&document, &contract)),
        SetupStep::new("capture controller", || {
            capture_page::attach(&document, &contract);
            Ok(())
        }),
    ]);
    Ok(())
}

fn attach_error_logging() -> Result<(), WebError> {
    dom::listen(&dom::window()?, "error", |event: Event| {
        let detail = event
            .dyn_ref::<ErrorEvent>()
            .map(ErrorEvent::message)
            .unwrap_or_default();
        error!(%detail, "unhandled error");
    })
}
