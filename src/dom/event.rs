//! Events - listener type and the event object handed to listeners.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::node::DomNode;

/// Event listener callback (Rc so one handler can be shared by several nodes).
pub type Listener = Rc<dyn Fn(&Event)>;

/// An event travelling from its target up through the ancestors.
pub struct Event {
    kind: String,
    target: DomNode,
    current_target: RefCell<DomNode>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub(crate) fn new(kind: &str, target: DomNode) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            current_target: RefCell::new(target.clone()),
            target,
            propagation_stopped: Cell::new(false),
        }
    }

    /// Event type without the `on` prefix, e.g. `click`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Node the event was dispatched on.
    pub fn target(&self) -> &DomNode {
        &self.target
    }

    /// Node whose listeners are running right now.
    pub fn current_target(&self) -> DomNode {
        self.current_target.borrow().clone()
    }

    /// Stop the event from reaching further ancestors.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Whether [`stop_propagation`](Event::stop_propagation) was called.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn set_current_target(&self, node: DomNode) {
        *self.current_target.borrow_mut() = node;
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .finish()
    }
}
