use crate::config::ModalConfig;
use crate::dom::{Dom, NodeId};
use crate::events::{BindingTarget, DispatchOutcome, EventKind, EventState, ListenerStore, ModalEvent};
use crate::gallery::GalleryItem;
use crate::host::ModalHost;
use crate::html::parse_html;
use crate::modal::{GalleryModalController, ModalState};
use crate::{Error, Result};

const DEFAULT_TRACE_LOG_LIMIT: usize = 10_000;

/// In-memory page: the parsed document plus browser-side state the modal touches.
#[derive(Debug, Clone)]
pub(crate) struct Page {
    pub(crate) dom: Dom,
    body: NodeId,
    active_element: Option<NodeId>,
}

impl Page {
    pub(crate) fn new(mut dom: Dom) -> Result<Self> {
        // Fragments without a <body> still need somewhere to hold body styles.
        let body = match dom.query_selector("body")? {
            Some(body) => body,
            None => dom.create_detached_element("body"),
        };
        Ok(Self {
            dom,
            body,
            active_element: None,
        })
    }
}

impl ModalHost for Page {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.by_id(id)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.dom.query_selector_from(*scope, selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.dom.query_selector_all(selector).unwrap_or_default()
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        self.dom.closest(*node, selector).ok().flatten()
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.dom.text_content(*node)
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        self.dom.set_text_content(*node, text);
    }

    fn clear_children(&mut self, node: &NodeId) {
        self.dom.clear_children(*node);
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.dom.attr(*node, name)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.dom.set_attr(*node, name, value);
    }

    fn add_class(&mut self, node: &NodeId, class_name: &str) {
        self.dom.class_add(*node, class_name);
    }

    fn remove_class(&mut self, node: &NodeId, class_name: &str) {
        self.dom.class_remove(*node, class_name);
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        self.dom.set_style_property(*node, property, value);
    }

    fn set_body_style(&mut self, property: &str, value: &str) {
        let body = self.body;
        self.dom.set_style_property(body, property, value);
    }

    fn focus(&mut self, node: &NodeId) {
        if self.dom.element(*node).is_some() {
            self.active_element = Some(*node);
        }
    }
}

/// Deterministic page runner for the gallery modal.
///
/// Parses an HTML document, attaches a [`GalleryModalController`] exactly the way a
/// browser page load would, and offers user actions (`click`, `press_key`) plus
/// assertions against the resulting document.
#[derive(Debug)]
pub struct Harness {
    page: Page,
    listeners: ListenerStore,
    controller: Option<GalleryModalController<NodeId>>,
    trace: bool,
    trace_events: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_config(html, ModalConfig::default())
    }

    pub fn from_html_with_config(html: &str, config: ModalConfig) -> Result<Self> {
        config.validate()?;
        let mut page = Page::new(parse_html(html)?)?;
        let controller = GalleryModalController::attach(&mut page, config);

        let mut listeners = ListenerStore::default();
        if let Some(controller) = &controller {
            for binding in controller.bindings() {
                let node = match &binding.target {
                    BindingTarget::Element(node) => *node,
                    BindingTarget::Document => page.dom.root,
                };
                listeners.add(node, binding.event, binding.trigger);
            }
        }

        Ok(Self {
            page,
            listeners,
            controller,
            trace: false,
            trace_events: true,
            trace_logs: Vec::new(),
            trace_log_limit: DEFAULT_TRACE_LOG_LIMIT,
            trace_to_stderr: true,
        })
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        if self.trace_logs.len() > self.trace_log_limit {
            let excess = self.trace_logs.len() - self.trace_log_limit;
            self.trace_logs.drain(..excess);
        }
        Ok(())
    }

    /// Whether the page carried an overlay and the modal is live.
    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn modal_state(&self) -> Option<ModalState> {
        self.controller.as_ref().map(GalleryModalController::state)
    }

    /// Programmatic handle, absent when the page has no overlay.
    pub fn album_modal(&mut self) -> Option<ModalHandle<'_>> {
        let controller = self.controller.as_mut()?;
        Some(ModalHandle {
            controller,
            page: &mut self.page,
        })
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, EventKind::Click, None);
        Ok(())
    }

    /// Presses `key` on the focused element (or the body), as a `keydown`.
    pub fn press_key(&mut self, key: &str) -> Result<DispatchOutcome> {
        let target = self
            .page
            .active_element
            .filter(|node| self.page.dom.is_connected(*node))
            .or_else(|| self.page.dom.query_selector("body").ok().flatten())
            .unwrap_or(self.page.dom.root);
        Ok(self.dispatch_event(target, EventKind::KeyDown, Some(key.to_string())))
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<DispatchOutcome> {
        let target = self.select_one(selector)?;
        let Some(kind) = EventKind::from_name(event) else {
            // Nothing on the page listens for other event types.
            return Ok(DispatchOutcome::default());
        };
        Ok(self.dispatch_event(target, kind, None))
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.page.focus(&target);
        Ok(())
    }

    /// Replaces an element's text, as page script would.
    pub fn set_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.page.dom.set_text_content(target, text);
        Ok(())
    }

    pub fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.page.dom.set_attr(target, name, value);
        Ok(())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.page.dom.text_content(target))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.page.dom.attr(target, name))
    }

    pub fn body_style(&self, property: &str) -> String {
        self.page.dom.style_property(self.page.body, property)
    }

    pub fn active_element_id(&self) -> Option<String> {
        self.page
            .active_element
            .and_then(|node| self.page.dom.attr(node, "id"))
    }

    pub fn active_element_matches(&self, selector: &str) -> Result<bool> {
        let Some(active) = self.page.active_element else {
            return Ok(false);
        };
        Ok(self.page.dom.query_selector_all(selector)?.contains(&active))
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    /// `None` expects the attribute to be absent.
    pub fn assert_attr(&self, selector: &str, name: &str, expected: Option<&str>) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.dom.attr(target, name);
        if actual.as_deref() != expected {
            return Err(Error::AssertionFailed {
                selector: format!("{selector}[{name}]"),
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_has_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.dom.class_contains(target, class_name);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: format!("{selector}.{class_name}"),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.page.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.page
            .dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.page.dom.dump_node(node_id), 200)
    }

    fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: EventKind,
        key: Option<String>,
    ) -> DispatchOutcome {
        let mut event = EventState::new(event_type, target, key);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.page.dom.parent(node);
        }

        // Target phase, then bubble towards the document.
        for node in path {
            event.current_target = node;
            self.invoke_listeners(node, &mut event);
            if event.propagation_stopped {
                self.trace_event_done(&event, "propagation_stopped");
                return event.outcome();
            }
        }

        self.trace_event_done(&event, "completed");
        event.outcome()
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut EventState) {
        let triggers = self.listeners.get(node_id, event.event_type);
        for trigger in triggers {
            let Some(controller) = self.controller.as_mut() else {
                return;
            };
            let modal_event = ModalEvent {
                target: event.target,
                key: event.key.clone(),
            };
            let outcome = controller.handle(&mut self.page, trigger, &modal_event);
            event.apply(outcome);
            event.listeners_invoked += 1;

            if self.trace {
                let target_label = self.page.dom.node_label(event.target);
                let current_label = self.page.dom.node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} trigger={} default_prevented={}",
                    event.event_type.as_str(),
                    target_label,
                    current_label,
                    trigger.label(),
                    event.default_prevented
                ));
                let state = self.modal_state().unwrap_or_default();
                self.trace_line(format!(
                    "[modal] {} open={} index={}",
                    trigger.label(),
                    state.is_open(),
                    state
                        .current_index()
                        .map_or_else(|| "-1".to_string(), |index| index.to_string())
                ));
            }
        }
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        if !self.trace {
            return;
        }
        let target_label = self.page.dom.node_label(event.target);
        let current_label = self.page.dom.node_label(event.current_target);
        self.trace_event_line(format!(
            "[event] done {} target={} current={} outcome={} default_prevented={} propagation_stopped={}",
            event.event_type.as_str(),
            target_label,
            current_label,
            outcome,
            event.default_prevented,
            event.propagation_stopped
        ));
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}

/// Programmatic access to the page's modal: `open`, `close`, `show_at`.
#[derive(Debug)]
pub struct ModalHandle<'a> {
    controller: &'a mut GalleryModalController<NodeId>,
    page: &'a mut Page,
}

impl ModalHandle<'_> {
    /// Opens the modal with explicit metadata for the image matching `image_selector`.
    ///
    /// `None` opens it with no image reference. `item.image` is ignored; the selector
    /// names the image instead.
    pub fn open(&mut self, image_selector: Option<&str>, item: GalleryItem<()>) -> Result<()> {
        let image = match image_selector {
            Some(selector) => Some(
                self.page
                    .dom
                    .query_selector(selector)?
                    .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))?,
            ),
            None => None,
        };
        let item = GalleryItem {
            image,
            band: item.band,
            album: item.album,
            year: item.year,
            description: item.description,
            index: item.index,
        };
        self.controller.open(self.page, &item);
        Ok(())
    }

    pub fn close(&mut self) {
        self.controller.close(self.page);
    }

    pub fn show_at(&mut self, index: isize) {
        self.controller.show_at(self.page, index);
    }

    pub fn show_prev(&mut self) {
        self.controller.show_prev(self.page);
    }

    pub fn show_next(&mut self) {
        self.controller.show_next(self.page);
    }

    pub fn state(&self) -> ModalState {
        self.controller.state()
    }

    pub fn gallery_len(&self) -> usize {
        self.controller.gallery().len()
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let truncated: String = it.by_ref().take(max_chars).collect();
    if it.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}
