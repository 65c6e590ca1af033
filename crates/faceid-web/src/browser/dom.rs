//! Small `web-sys` helpers shared by the page controllers.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use crate::WebError;

thread_local! {
    static LISTENERS: RefCell<Vec<Closure<dyn FnMut(Event)>>> = const { RefCell::new(Vec::new()) };
}

pub(super) fn window() -> Result<Window, WebError> {
    web_sys::window().ok_or_else(|| WebError::Dom("window is unavailable".to_string()))
}

pub(super) fn document() -> Result<Document, WebError> {
    window()?
        .document()
        .ok_or_else(|| WebError::Dom("document is unavailable".to_string()))
}

/// Looks up an element by id and casts it, or `None` when absent.
pub(super) fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

/// Runs a selector query and casts the first match, or `None` when absent.
pub(super) fn query<T: JsCast>(root: &impl AsRef<Element>, selector: &str) -> Option<T> {
    root.as_ref()
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<T>().ok())
}

/// Document-level variant of [`query`].
pub(super) fn query_document<T: JsCast>(document: &Document, selector: &str) -> Option<T> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<T>().ok())
}

/// Returns every element matching `selector`.
pub(super) fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(super) fn set_visible(element: &HtmlElement, visible: bool, display: &str) {
    let value = if visible { display } else { "none" };
    if element.style().set_property("display", value).is_err() {
        tracing::warn!(id = %element.id(), "failed to set element display");
    }
}

pub(super) fn set_class(element: &Element, class: &str, on: bool) {
    if element.class_list().toggle_with_force(class, on).is_err() {
        tracing::warn!(class, "failed to toggle element class");
    }
}

/// Attaches `handler` to `target` for the lifetime of the page.
pub(super) fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), WebError>
where
    F: FnMut(Event) + 'static,
{
    let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .map_err(|_| WebError::Dom(format!("failed to attach {event} listener")))?;
    LISTENERS.with(|listeners| listeners.borrow_mut().push(callback));
    Ok(())
}

pub(super) fn alert(message: &str) {
    match window() {
        Ok(window) => {
            if window.alert_with_message(message).is_err() {
                tracing::warn!("alert could not be shown");
            }
        }
        Err(error) => tracing::warn!(%error, "alert skipped"),
    }
}
