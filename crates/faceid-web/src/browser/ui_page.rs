//! Panel, password toggle, form validation and upload preview listeners.

use std::cell::RefCell;
use std::rc::Rc;

use faceid_auth::{FormFields, ServerNotice, UploadedFile};
use faceid_ui::{
    FaceButton, IconClass, PageFacts, PageState, PanelState, PasswordField, UploadPreview,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, File, FileReader, HtmlButtonElement, HtmlFormElement,
    HtmlImageElement, HtmlInputElement,
};

use super::dom;
use crate::{PageContract, WebError, decide_form_submit, is_register_path};

/// Elements the panel reducer renders onto.
struct Panel {
    home: Option<Element>,
    container: Option<Element>,
    state: PanelState,
}

impl Panel {
    fn rendered(&self) -> PanelState {
        PanelState::from_rendered(
            &self.home.as_ref().map(Element::class_name).unwrap_or_default(),
            &self
                .container
                .as_ref()
                .map(Element::class_name)
                .unwrap_or_default(),
        )
    }

    /// Applies `change` and touches only the classes whose flag changed.
    fn update(&mut self, change: impl FnOnce(&mut PanelState)) {
        let before = self.state;
        change(&mut self.state);
        if let Some(home) = &self.home
            && before.shown != self.state.shown
        {
            dom::set_class(home, "show", self.state.shown);
        }
        if let Some(container) = &self.container
            && before.active != self.state.active
        {
            dom::set_class(container, "active", self.state.active);
        }
    }
}

/// Attaches every UI listener the page supports.
pub(super) fn attach(document: &Document, contract: &PageContract) -> Result<(), WebError> {
    let mut panel = Panel {
        home: dom::query_document(document, &contract.home_selector),
        container: dom::query_document(document, &contract.form_container_selector),
        state: PanelState::default(),
    };
    panel.state = panel.rendered();

    let facts = gather_facts(document, contract, panel.state)?;
    let state = PageState::bootstrap(&facts);
    panel.update(|current| *current = state.panel);
    let panel = Rc::new(RefCell::new(panel));

    if state.face_button != FaceButton::Idle
        && let Some(button) = face_button(document, contract)
    {
        render_face_button(&button, state.face_button);
    }

    attach_panel(document, contract, &panel)?;
    attach_password_toggles(document, contract)?;
    attach_face_login_scanning(document, contract)?;
    attach_validation(document)?;
    attach_upload_preview(document, contract)?;
    Ok(())
}

fn gather_facts(
    document: &Document,
    contract: &PageContract,
    rendered_panel: PanelState,
) -> Result<PageFacts, WebError> {
    let notice = dom::query_document::<Element>(document, &contract.error_notice_selector)
        .and_then(|element| element.text_content());
    let href = dom::window()?.location().href().unwrap_or_default();

    Ok(PageFacts {
        rendered_panel,
        notice: ServerNotice::parse(notice.as_deref()),
        has_signup_form: dom::query_document::<Element>(document, &contract.signup_form_selector)
            .is_some(),
        on_register_path: is_register_path(&href),
    })
}

pub(super) fn face_button(
    document: &Document,
    contract: &PageContract,
) -> Option<HtmlButtonElement> {
    let form = dom::by_id::<HtmlFormElement>(document, &contract.face_login_form_id)?;
    dom::query(&form, "button")
}

pub(super) fn render_face_button(button: &HtmlButtonElement, state: FaceButton) {
    button.set_text_content(Some(state.label()));
    button.set_disabled(!state.is_enabled());
}

fn attach_panel(
    document: &Document,
    contract: &PageContract,
    panel: &Rc<RefCell<Panel>>,
) -> Result<(), WebError> {
    let bindings: [(&str, bool, fn(&mut PanelState)); 4] = [
        (&contract.form_open_selector, false, PanelState::open),
        (&contract.form_close_selector, false, PanelState::close),
        (&contract.signup_selector, true, PanelState::switch_to_signup),
        (&contract.login_selector, true, PanelState::switch_to_login),
    ];

    for (selector, prevent_default, change) in bindings {
        let Some(trigger) = dom::query_document::<Element>(document, selector) else {
            continue;
        };
        let panel = Rc::clone(panel);
        dom::listen(&trigger, "click", move |event: Event| {
            if prevent_default {
                event.prevent_default();
            }
            panel.borrow_mut().update(change);
        })?;
    }
    Ok(())
}

fn attach_password_toggles(document: &Document, contract: &PageContract) -> Result<(), WebError> {
    for icon in dom::query_all(document, &contract.password_toggle_selector) {
        let Some(input) = icon
            .parent_element()
            .and_then(|parent| dom::query::<HtmlInputElement>(&parent, "input"))
        else {
            tracing::debug!("password toggle without a sibling input");
            continue;
        };

        let rendered_icon = if icon.class_list().contains(IconClass::Eye.css_class()) {
            IconClass::Eye
        } else {
            IconClass::EyeSlash
        };
        let mut field = PasswordField::from_rendered(&input.type_(), rendered_icon);
        let target = icon.clone();
        dom::listen(&icon, "click", move |_event: Event| {
            let before = field.icon();
            field.toggle();
            input.set_type(field.input_type());
            if target
                .class_list()
                .replace(before.css_class(), field.icon().css_class())
                .is_err()
            {
                tracing::warn!("password icon class could not be replaced");
            }
        })?;
    }
    Ok(())
}

fn attach_face_login_scanning(
    document: &Document,
    contract: &PageContract,
) -> Result<(), WebError> {
    let Some(form) = dom::by_id::<HtmlFormElement>(document, &contract.face_login_form_id) else {
        return Ok(());
    };
    let button = dom::query::<HtmlButtonElement>(&form, "button");
    dom::listen(&form, "submit", move |event: Event| {
        if event.default_prevented() {
            return;
        }
        tracing::info!("initiating face login");
        if let Some(button) = &button {
            let mut state = FaceButton::Idle;
            state.begin_scan();
            render_face_button(button, state);
        }
    })
}

fn attach_validation(document: &Document) -> Result<(), WebError> {
    for element in dom::query_all(document, "form") {
        let Ok(form) = element.dyn_into::<HtmlFormElement>() else {
            continue;
        };
        let target = form.clone();
        dom::listen(&form, "submit", move |event: Event| {
            let decision = decide_form_submit(&read_fields(&target));
            if let Some(alert) = decision.alert() {
                event.prevent_default();
                dom::alert(alert);
            }
        })?;
    }
    Ok(())
}

fn read_fields(form: &HtmlFormElement) -> FormFields {
    let value_of =
        |name: &str| dom::query::<HtmlInputElement>(form, &format!("input[name=\"{name}\"]"));

    FormFields {
        username: value_of("username").map(|input| input.value()),
        password: value_of("password").map(|input| input.value()),
        face_upload: dom::query::<HtmlInputElement>(form, "input[type=\"file\"]").map(
            |input| {
                input
                    .files()
                    .and_then(|files| files.get(0))
                    .map(|file| UploadedFile {
                        name: file.name(),
                        size_bytes: file.size() as u64,
                    })
            },
        ),
    }
}

fn attach_upload_preview(document: &Document, contract: &PageContract) -> Result<(), WebError> {
    let (Some(upload), Some(preview)) = (
        dom::by_id::<HtmlInputElement>(document, &contract.upload_input_id),
        dom::by_id::<HtmlImageElement>(document, &contract.upload_preview_id),
    ) else {
        return Ok(());
    };

    let source = upload.clone();
    dom::listen(&upload, "change", move |_event: Event| {
        let Some(file) = source.files().and_then(|files| files.get(0)) else {
            return;
        };
        if let Err(error) = read_preview(&file, &preview) {
            tracing::warn!(%error, "upload preview failed");
        }
    })
}

fn read_preview(file: &File, preview: &HtmlImageElement) -> Result<(), WebError> {
    let reader = FileReader::new().map_err(|_| WebError::Dom("FileReader unavailable".into()))?;
    let target = reader.clone();
    let preview = preview.clone();
    let onload = Closure::once_into_js(move || {
        let Some(data_url) = target.result().ok().and_then(|result| result.as_string()) else {
            return;
        };
        let mut state = UploadPreview::default();
        state.show(data_url);
        if let Some(source) = state.source() {
            preview.set_src(source);
        }
        dom::set_visible(&preview, state.is_visible(), "block");
    });
    reader.set_onload(Some(onload.unchecked_ref()));
    reader
        .read_as_data_url(file)
        .map_err(|_| WebError::Dom("file could not be read".into()))
}
