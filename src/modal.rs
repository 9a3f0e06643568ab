use tracing::{debug, trace};

use crate::config::ModalConfig;
use crate::events::{Binding, BindingTarget, EventKind, EventOutcome, ModalEvent, Trigger};
use crate::gallery::{GalleryIndex, GalleryItem, wrap_index};
use crate::host::ModalHost;

/// Open/closed state of the page's single modal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalState {
    is_open: bool,
    current_index: Option<usize>,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Gallery position on display; `None` is the closed sentinel, and also the value
    /// after an `open` that was given no index.
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }
}

/// Elements inside or around the overlay. Everything but the overlay is optional.
#[derive(Debug, Clone)]
struct ModalSlots<N> {
    overlay: N,
    image: Option<N>,
    title: Option<N>,
    band: Option<N>,
    year: Option<N>,
    description: Option<N>,
    extra: Option<N>,
    close: Option<N>,
    prev: Option<N>,
    next: Option<N>,
}

impl<N: Clone + PartialEq> ModalSlots<N> {
    fn resolve<H: ModalHost<Node = N>>(host: &H, config: &ModalConfig, overlay: N) -> Self {
        let within = |selector: &str| host.query_within(&overlay, selector);
        Self {
            image: host.element_by_id(&config.image_id),
            title: host.element_by_id(&config.title_id),
            band: host.element_by_id(&config.band_id),
            year: host.element_by_id(&config.year_id),
            description: host.element_by_id(&config.description_id),
            extra: host.element_by_id(&config.extra_id),
            close: within(&config.close_selector),
            prev: within(&config.prev_selector),
            next: within(&config.next_selector),
            overlay,
        }
    }
}

/// The gallery lightbox for one page.
///
/// Holds the modal state, the gallery index and the fixed binding table. Hosts route
/// every event matching a [`Binding`] into [`GalleryModalController::handle`].
#[derive(Debug, Clone)]
pub struct GalleryModalController<N> {
    config: ModalConfig,
    slots: ModalSlots<N>,
    gallery: GalleryIndex<N>,
    state: ModalState,
    bindings: Vec<Binding<N>>,
}

impl<N: Clone + PartialEq> GalleryModalController<N> {
    /// Sets the controller up on `host`, or returns `None` when the page has no overlay.
    pub fn attach<H: ModalHost<Node = N>>(host: &mut H, config: ModalConfig) -> Option<Self> {
        let Some(overlay) = host.element_by_id(&config.overlay_id) else {
            debug!(overlay_id = %config.overlay_id, "no modal overlay on page; gallery modal inactive");
            return None;
        };

        let slots = ModalSlots::resolve(host, &config, overlay);
        let gallery = GalleryIndex::scan(host, &config);

        let mut bindings = Vec::with_capacity(gallery.len() + 5);
        for (index, image) in gallery.iter().enumerate() {
            host.set_style(image, "cursor", "pointer");
            bindings.push(Binding {
                target: BindingTarget::Element(image.clone()),
                event: EventKind::Click,
                trigger: Trigger::Image(index),
            });
        }
        let controls = [
            (&slots.close, Trigger::Close),
            (&slots.prev, Trigger::Prev),
            (&slots.next, Trigger::Next),
        ];
        for (control, trigger) in controls {
            if let Some(control) = control {
                bindings.push(Binding {
                    target: BindingTarget::Element(control.clone()),
                    event: EventKind::Click,
                    trigger,
                });
            }
        }
        bindings.push(Binding {
            target: BindingTarget::Element(slots.overlay.clone()),
            event: EventKind::Click,
            trigger: Trigger::Overlay,
        });
        bindings.push(Binding {
            target: BindingTarget::Document,
            event: EventKind::KeyDown,
            trigger: Trigger::Keyboard,
        });

        host.set_attribute(&slots.overlay, "aria-hidden", "true");

        debug!(
            images = gallery.len(),
            bindings = bindings.len(),
            "gallery modal attached"
        );
        Some(Self {
            config,
            slots,
            gallery,
            state: ModalState::default(),
            bindings,
        })
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    pub fn gallery(&self) -> &GalleryIndex<N> {
        &self.gallery
    }

    pub fn bindings(&self) -> &[Binding<N>] {
        &self.bindings
    }

    pub fn overlay(&self) -> &N {
        &self.slots.overlay
    }

    /// Fills the modal from `item` and shows it. Missing fields display as empty text.
    pub fn open<H: ModalHost<Node = N>>(&mut self, host: &mut H, item: &GalleryItem<N>) {
        if let (Some(slot), Some(image)) = (&self.slots.image, &item.image) {
            let src = host.image_source(image);
            host.set_image_source(slot, &src);
            host.set_image_alt(slot, &item.alt_text());
        }

        if let Some(title) = &self.slots.title {
            host.set_text_content(title, &item.album);
        }
        if let Some(band) = &self.slots.band {
            host.set_text_content(band, &item.band);
        }
        if let Some(year) = &self.slots.year {
            host.set_text_content(year, &item.year);
        }
        if let Some(description) = &self.slots.description {
            let text = if item.description.is_empty() {
                item.image
                    .as_ref()
                    .and_then(|image| host.attribute(image, &self.config.description_attr))
                    .unwrap_or_default()
            } else {
                item.description.clone()
            };
            host.set_text_content(description, &text);
        }
        // Reserved for future content; always starts empty.
        if let Some(extra) = &self.slots.extra {
            host.clear_children(extra);
        }

        host.add_class(&self.slots.overlay, &self.config.open_class);
        host.set_attribute(&self.slots.overlay, "aria-hidden", "false");
        host.set_body_style("overflow", "hidden");

        match &self.slots.close {
            Some(close) => host.focus(close),
            None => trace!("no close control; focus left in place"),
        }

        self.state.is_open = true;
        if let Some(index) = item.index {
            self.state.current_index = Some(index);
        }
        debug!(index = ?item.index, album = %item.album, "gallery modal opened");
    }

    pub fn close<H: ModalHost<Node = N>>(&mut self, host: &mut H) {
        host.remove_class(&self.slots.overlay, &self.config.open_class);
        host.set_attribute(&self.slots.overlay, "aria-hidden", "true");
        host.set_body_style("overflow", "");
        // Drop the source so a large decoded image is not kept alive.
        if let Some(image) = &self.slots.image {
            host.set_image_source(image, "");
        }
        self.state = ModalState::default();
        debug!("gallery modal closed");
    }

    /// Opens the gallery item at `index`, wrapping out-of-range positions.
    pub fn show_at<H: ModalHost<Node = N>>(&mut self, host: &mut H, index: isize) {
        let Some(position) = wrap_index(index, self.gallery.len()) else {
            trace!(index, "show_at on empty gallery ignored");
            return;
        };
        let Some(image) = self.gallery.get(position).cloned() else {
            return;
        };
        let item = GalleryItem::read(host, &self.config, &image, position);
        self.open(host, &item);
    }

    pub fn show_prev<H: ModalHost<Node = N>>(&mut self, host: &mut H) {
        self.step(host, -1);
    }

    pub fn show_next<H: ModalHost<Node = N>>(&mut self, host: &mut H) {
        self.step(host, 1);
    }

    fn step<H: ModalHost<Node = N>>(&mut self, host: &mut H, delta: isize) {
        let Some(current) = self.state.current_index else {
            trace!(delta, "navigation ignored; modal not positioned");
            return;
        };
        let Ok(current) = isize::try_from(current) else {
            return;
        };
        self.show_at(host, current + delta);
    }

    /// Runs the action bound to `trigger` and reports what to do with the event.
    pub fn handle<H: ModalHost<Node = N>>(
        &mut self,
        host: &mut H,
        trigger: Trigger,
        event: &ModalEvent<N>,
    ) -> EventOutcome {
        match trigger {
            Trigger::Image(index) => self.on_image_click(host, index),
            Trigger::Close => {
                self.close(host);
                EventOutcome::NONE
            }
            Trigger::Prev => {
                self.show_prev(host);
                EventOutcome::STOP_PROPAGATION
            }
            Trigger::Next => {
                self.show_next(host);
                EventOutcome::STOP_PROPAGATION
            }
            Trigger::Overlay => {
                if event.target == self.slots.overlay {
                    self.close(host);
                }
                EventOutcome::NONE
            }
            Trigger::Keyboard => self.on_key_down(host, event.key.as_deref().unwrap_or_default()),
        }
    }

    fn on_image_click<H: ModalHost<Node = N>>(&mut self, host: &mut H, index: usize) -> EventOutcome {
        if let Some(image) = self.gallery.get(index).cloned() {
            let item = GalleryItem::read(host, &self.config, &image, index);
            self.open(host, &item);
        }
        EventOutcome::NONE
    }

    fn on_key_down<H: ModalHost<Node = N>>(&mut self, host: &mut H, key: &str) -> EventOutcome {
        let visible = host
            .attribute(&self.slots.overlay, "aria-hidden")
            .is_some_and(|value| value == "false");
        if !visible {
            return EventOutcome::NONE;
        }

        match key {
            "Escape" => {
                self.close(host);
                EventOutcome::NONE
            }
            "ArrowLeft" => {
                self.show_prev(host);
                EventOutcome::PREVENT_DEFAULT
            }
            "ArrowRight" => {
                self.show_next(host);
                EventOutcome::PREVENT_DEFAULT
            }
            other => {
                trace!(key = other, "key ignored by gallery modal");
                EventOutcome::NONE
            }
        }
    }
}
