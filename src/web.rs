//! Browser host: runs the gallery modal against the live document through `web-sys`.
//!
//! Loading the module installs the controller, mirroring a page script that runs once
//! at load. The programmatic handle is published as `window.__albumModal`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, HtmlImageElement, KeyboardEvent};

use crate::config::ModalConfig;
use crate::events::{BindingTarget, ModalEvent};
use crate::gallery::GalleryItem;
use crate::host::ModalHost;
use crate::modal::{GalleryModalController, ModalState};

const HANDLE_PROPERTY: &str = "__albumModal";

pub struct WebHost {
    document: Document,
}

impl WebHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

fn set_inline_style(element: &HtmlElement, property: &str, value: &str) {
    let style = element.style();
    let result = if value.is_empty() {
        style.remove_property(property).map(|_| ())
    } else {
        style.set_property(property, value)
    };
    if let Err(err) = result {
        warn!(property, ?err, "inline style update rejected");
    }
}

impl ModalHost for WebHost {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text_content(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn clear_children(&mut self, node: &Element) {
        node.set_inner_html("");
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        if let Err(err) = node.set_attribute(name, value) {
            warn!(name, ?err, "attribute update rejected");
        }
    }

    fn add_class(&mut self, node: &Element, class_name: &str) {
        if let Err(err) = node.class_list().add_1(class_name) {
            warn!(class_name, ?err, "class add rejected");
        }
    }

    fn remove_class(&mut self, node: &Element, class_name: &str) {
        if let Err(err) = node.class_list().remove_1(class_name) {
            warn!(class_name, ?err, "class removal rejected");
        }
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            set_inline_style(element, property, value);
        }
    }

    fn set_body_style(&mut self, property: &str, value: &str) {
        if let Some(body) = self.document.body() {
            set_inline_style(&body, property, value);
        }
    }

    fn focus(&mut self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            if let Err(err) = element.focus() {
                warn!(?err, "focus rejected");
            }
        }
    }

    fn image_source(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(image) => image.src(),
            None => node.get_attribute("src").unwrap_or_default(),
        }
    }

    fn set_image_source(&mut self, node: &Element, src: &str) {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(image) => image.set_src(src),
            None => self.set_attribute(node, "src", src),
        }
    }

    fn set_image_alt(&mut self, node: &Element, alt: &str) {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(image) => image.set_alt(alt),
            None => self.set_attribute(node, "alt", alt),
        }
    }
}

struct Session {
    controller: GalleryModalController<Element>,
    host: WebHost,
}

/// Runs `action` on the session unless a call further up the stack already holds it.
///
/// Focus changes dispatch `focus`/`blur` synchronously, so page handlers for those can
/// re-enter the modal while it is mid-update; such calls are dropped.
fn with_session<R>(
    session: &RefCell<Session>,
    operation: &str,
    action: impl FnOnce(&mut GalleryModalController<Element>, &mut WebHost) -> R,
) -> Option<R> {
    let Ok(mut session) = session.try_borrow_mut() else {
        warn!(operation, "gallery modal busy; re-entrant call skipped");
        return None;
    };
    let Session { controller, host } = &mut *session;
    Some(action(controller, host))
}

/// `window.__albumModal`: `open(item)`, `close()`, `showAt(index)`.
#[wasm_bindgen]
pub struct AlbumModal {
    session: Rc<RefCell<Session>>,
}

#[wasm_bindgen]
impl AlbumModal {
    /// Opens the modal from `{ imgEl, band, album, year, desc, index }`; every field is
    /// optional.
    pub fn open(&self, item: JsValue) {
        let item = item_from_js(&item);
        with_session(&self.session, "open", |controller, host| {
            controller.open(host, &item);
        });
    }

    pub fn close(&self) {
        with_session(&self.session, "close", |controller, host| {
            controller.close(host);
        });
    }

    #[wasm_bindgen(js_name = showAt)]
    pub fn show_at(&self, index: i32) {
        with_session(&self.session, "showAt", |controller, host| {
            controller.show_at(host, index as isize);
        });
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.state().is_some_and(|state| state.is_open())
    }

    /// Current gallery position, `-1` when closed.
    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> i32 {
        self.state()
            .and_then(|state| state.current_index())
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1)
    }
}

impl AlbumModal {
    fn state(&self) -> Option<ModalState> {
        let session = self.session.try_borrow().ok()?;
        Some(session.controller.state())
    }
}

fn item_from_js(item: &JsValue) -> GalleryItem<Element> {
    let field = |name: &str| Reflect::get(item, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);
    let text = |name: &str| field(name).as_string().unwrap_or_default();

    GalleryItem {
        image: field("imgEl").dyn_into::<Element>().ok(),
        band: text("band"),
        album: text("album"),
        year: text("year"),
        description: text("desc"),
        index: field("index")
            .as_f64()
            .filter(|index| index.is_finite() && *index >= 0.0)
            .map(|index| index as usize),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    install().map(|_| ())
}

pub fn install() -> Result<Option<AlbumModal>, JsValue> {
    install_with_config(ModalConfig::default())
}

/// Attaches the controller to the current document and wires its bindings.
///
/// Returns `Ok(None)` when the page has no overlay; nothing is registered then.
pub fn install_with_config(config: ModalConfig) -> Result<Option<AlbumModal>, JsValue> {
    config
        .validate()
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;

    let mut host = WebHost::new(document.clone());
    let Some(controller) = GalleryModalController::attach(&mut host, config) else {
        return Ok(None);
    };
    let bindings = controller.bindings().to_vec();
    let session = Rc::new(RefCell::new(Session { controller, host }));

    for binding in bindings {
        let target: EventTarget = match binding.target {
            BindingTarget::Element(element) => element.into(),
            BindingTarget::Document => document.clone().into(),
        };
        let shared = Rc::clone(&session);
        let trigger = binding.trigger;
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let outcome = with_session(&shared, &trigger.label(), |controller, host| {
                let target = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .or_else(|| host.document.document_element())?;
                let key = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key);
                Some(controller.handle(host, trigger, &ModalEvent { target, key }))
            });
            let Some(outcome) = outcome.flatten() else {
                return;
            };
            if outcome.stop_propagation {
                event.stop_propagation();
            }
            if outcome.prevent_default {
                event.prevent_default();
            }
        });
        target.add_event_listener_with_callback(
            binding.event.as_str(),
            callback.as_ref().unchecked_ref(),
        )?;
        // Bindings live for the rest of the page.
        callback.forget();
    }

    let published = AlbumModal {
        session: Rc::clone(&session),
    };
    Reflect::set(
        &window,
        &JsValue::from_str(HANDLE_PROPERTY),
        &JsValue::from(published),
    )?;
    debug!("gallery modal installed in browser");

    Ok(Some(AlbumModal { session }))
}
