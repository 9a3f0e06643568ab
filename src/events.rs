use std::collections::HashMap;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "click" => Some(Self::Click),
            "keydown" => Some(Self::KeyDown),
            _ => None,
        }
    }
}

/// Which controller action a binding runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Gallery image at a fixed document-order position.
    Image(usize),
    Close,
    Prev,
    Next,
    /// Click anywhere inside the overlay; only acts when the overlay itself is the target.
    Overlay,
    Keyboard,
}

impl Trigger {
    pub fn label(self) -> String {
        match self {
            Self::Image(index) => format!("image[{index}]"),
            Self::Close => "close".into(),
            Self::Prev => "prev".into(),
            Self::Next => "next".into(),
            Self::Overlay => "overlay".into(),
            Self::Keyboard => "keyboard".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget<N> {
    Element(N),
    Document,
}

/// One row of the controller's fixed listener table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<N> {
    pub target: BindingTarget<N>,
    pub event: EventKind,
    pub trigger: Trigger,
}

/// What a handler sees of the event being dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalEvent<N> {
    pub target: N,
    /// DOM `key` value for keyboard events.
    pub key: Option<String>,
}

impl<N> ModalEvent<N> {
    pub fn click(target: N) -> Self {
        Self { target, key: None }
    }

    pub fn key_down(target: N, key: impl Into<String>) -> Self {
        Self {
            target,
            key: Some(key.into()),
        }
    }
}

/// Side effects a handler requests on the event itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub stop_propagation: bool,
    pub prevent_default: bool,
}

impl EventOutcome {
    pub const NONE: Self = Self {
        stop_propagation: false,
        prevent_default: false,
    };
    pub const STOP_PROPAGATION: Self = Self {
        stop_propagation: true,
        prevent_default: false,
    };
    pub const PREVENT_DEFAULT: Self = Self {
        stop_propagation: false,
        prevent_default: true,
    };
}

/// Result of dispatching one event through the in-memory page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub listeners_invoked: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: EventKind,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) key: Option<String>,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) listeners_invoked: usize,
}

impl EventState {
    pub(crate) fn new(event_type: EventKind, target: NodeId, key: Option<String>) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            key,
            default_prevented: false,
            propagation_stopped: false,
            listeners_invoked: 0,
        }
    }

    pub(crate) fn apply(&mut self, outcome: EventOutcome) {
        self.default_prevented |= outcome.prevent_default;
        self.propagation_stopped |= outcome.stop_propagation;
    }

    pub(crate) fn outcome(&self) -> DispatchOutcome {
        DispatchOutcome {
            default_prevented: self.default_prevented,
            propagation_stopped: self.propagation_stopped,
            listeners_invoked: self.listeners_invoked,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<EventKind, Vec<Trigger>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: EventKind, trigger: Trigger) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(trigger);
    }

    pub(crate) fn get(&self, node_id: NodeId, event: EventKind) -> Vec<Trigger> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(&event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.map
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}
