//! Host nodes - elements and text nodes with DOM move semantics.
//!
//! A [`DomNode`] is a cheap shared handle. Equality is identity: two handles
//! are equal when they point at the same node. Inserting a node that already
//! has a parent moves it, exactly like the browser DOM.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DomError;

use super::event::{Event, Listener};
use super::mutation::{MutationRecord, ObserverInner};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Element namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
    /// `http://www.w3.org/1999/xhtml`
    #[default]
    Html,
    /// `http://www.w3.org/2000/svg`
    Svg,
}

impl Namespace {
    /// Namespace URI.
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => super::HTML_NAMESPACE,
            Namespace::Svg => super::SVG_NAMESPACE,
        }
    }
}

// =============================================================================
// Node Storage
// =============================================================================

struct ElementData {
    tag: String,
    namespace: Namespace,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    listeners: Vec<(String, Listener)>,
}

enum NodeData {
    Element(ElementData),
    Text(String),
}

struct Inner {
    id: u64,
    data: RefCell<NodeData>,
    parent: RefCell<Weak<Inner>>,
    children: RefCell<Vec<DomNode>>,
    observers: RefCell<Vec<Weak<ObserverInner>>>,
    /// Values living exactly as long as this node (reactive bindings).
    retained: RefCell<Vec<Box<dyn Any>>>,
}

/// Handle to an element or text node of the host tree.
#[derive(Clone)]
pub struct DomNode(Rc<Inner>);

/// Non-owning handle, used to remember an attachment point.
#[derive(Clone, Default)]
pub struct WeakDomNode(Weak<Inner>);

impl WeakDomNode {
    /// The node, if it is still alive.
    pub fn upgrade(&self) -> Option<DomNode> {
        self.0.upgrade().map(DomNode)
    }
}

impl DomNode {
    fn new(data: NodeData) -> Self {
        DomNode(Rc::new(Inner {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            data: RefCell::new(data),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            retained: RefCell::new(Vec::new()),
        }))
    }

    /// Create an HTML element.
    pub fn element(tag: &str) -> Self {
        Self::element_ns(Namespace::Html, tag)
    }

    /// Create an element in the given namespace.
    pub fn element_ns(namespace: Namespace, tag: &str) -> Self {
        Self::new(NodeData::Element(ElementData {
            tag: tag.to_string(),
            namespace,
            attributes: Vec::new(),
            style: Vec::new(),
            listeners: Vec::new(),
        }))
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeData::Text(content.into()))
    }

    /// Process-unique node id (for logs).
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Whether both handles point at the same node.
    pub fn is_same_node(&self, other: &DomNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Weak handle to this node.
    pub fn downgrade(&self) -> WeakDomNode {
        WeakDomNode(Rc::downgrade(&self.0))
    }

    // =========================================================================
    // Kind
    // =========================================================================

    /// Whether this is an element.
    pub fn is_element(&self) -> bool {
        matches!(*self.0.data.borrow(), NodeData::Element(_))
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(*self.0.data.borrow(), NodeData::Text(_))
    }

    /// Tag name of an element.
    pub fn tag_name(&self) -> Option<String> {
        match &*self.0.data.borrow() {
            NodeData::Element(el) => Some(el.tag.clone()),
            NodeData::Text(_) => None,
        }
    }

    /// Namespace of an element.
    pub fn namespace(&self) -> Option<Namespace> {
        match &*self.0.data.borrow() {
            NodeData::Element(el) => Some(el.namespace),
            NodeData::Text(_) => None,
        }
    }

    /// Text of a text node, or the concatenated text of an element's subtree.
    pub fn text_content(&self) -> String {
        match &*self.0.data.borrow() {
            NodeData::Text(text) => text.clone(),
            NodeData::Element(_) => self.children().iter().map(DomNode::text_content).collect(),
        }
    }

    /// Replace the data of a text node, or the children of an element with a
    /// single text node.
    pub fn set_text_content(&self, content: &str) {
        let is_text = {
            let mut data = self.0.data.borrow_mut();
            match &mut *data {
                NodeData::Text(text) => {
                    *text = content.to_string();
                    true
                }
                NodeData::Element(_) => false,
            }
        };

        if is_text {
            self.notify(&MutationRecord::character_data(self));
        } else {
            let text = DomNode::text(content);
            // An element can always hold a fresh text node.
            let _ = self.replace_children(&[text]);
        }
    }

    // =========================================================================
    // Tree Queries
    // =========================================================================

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<DomNode> {
        self.0.parent.borrow().upgrade().map(DomNode)
    }

    /// Snapshot of the children.
    pub fn children(&self) -> Vec<DomNode> {
        self.0.children.borrow().clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    /// First child.
    pub fn first_child(&self) -> Option<DomNode> {
        self.0.children.borrow().first().cloned()
    }

    /// Sibling that follows this node in its parent.
    pub fn next_sibling(&self) -> Option<DomNode> {
        let parent = self.parent()?;
        let children = parent.0.children.borrow();
        let index = children.iter().position(|c| c == self)?;
        children.get(index + 1).cloned()
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &DomNode) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node == *self {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    fn position_of(&self, child: &DomNode) -> Option<usize> {
        self.0.children.borrow().iter().position(|c| c == child)
    }

    // =========================================================================
    // Tree Mutation
    // =========================================================================

    fn ensure_can_contain(&self, child: &DomNode) -> Result<(), DomError> {
        if !self.is_element() {
            return Err(DomError::HierarchyRequest("text nodes cannot have children"));
        }
        if child.contains(self) {
            return Err(DomError::HierarchyRequest("node would become its own ancestor"));
        }
        Ok(())
    }

    /// Remove this node from its parent, if any.
    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            // The parent link was just read, so this cannot fail.
            let _ = parent.remove_child(self);
        }
    }

    /// Append `child`, moving it out of its current parent.
    pub fn append_child(&self, child: &DomNode) -> Result<(), DomError> {
        self.insert_before(child, None)
    }

    /// Insert `child` before `reference`, or at the end when `reference` is `None`.
    pub fn insert_before(&self, child: &DomNode, reference: Option<&DomNode>) -> Result<(), DomError> {
        self.ensure_can_contain(child)?;
        if let Some(reference) = reference {
            if reference.parent().as_ref() != Some(self) {
                return Err(DomError::NotAChild);
            }
            if reference == child {
                return Ok(());
            }
        }

        child.remove();

        let index = match reference {
            Some(reference) => self.position_of(reference).ok_or(DomError::NotAChild)?,
            None => self.child_count(),
        };
        self.0.children.borrow_mut().insert(index, child.clone());
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);

        tracing::trace!(parent = self.id(), child = child.id(), index, "insert");
        self.notify(&MutationRecord::child_list(self, vec![child.clone()], Vec::new()));
        Ok(())
    }

    /// Replace `old` (a child of this node) with `new`.
    pub fn replace_child(&self, new: &DomNode, old: &DomNode) -> Result<(), DomError> {
        if old.parent().as_ref() != Some(self) {
            return Err(DomError::NotAChild);
        }
        if new == old {
            return Ok(());
        }
        self.ensure_can_contain(new)?;

        new.remove();

        let index = self.position_of(old).ok_or(DomError::NotAChild)?;
        self.0.children.borrow_mut()[index] = new.clone();
        *old.0.parent.borrow_mut() = Weak::new();
        *new.0.parent.borrow_mut() = Rc::downgrade(&self.0);

        tracing::trace!(parent = self.id(), old = old.id(), new = new.id(), "replace");
        self.notify(&MutationRecord::child_list(self, vec![new.clone()], vec![old.clone()]));
        Ok(())
    }

    /// Remove `child` from this node.
    pub fn remove_child(&self, child: &DomNode) -> Result<(), DomError> {
        let index = self.position_of(child).ok_or(DomError::NotAChild)?;
        self.0.children.borrow_mut().remove(index);
        *child.0.parent.borrow_mut() = Weak::new();

        tracing::trace!(parent = self.id(), child = child.id(), "remove");
        self.notify(&MutationRecord::child_list(self, Vec::new(), vec![child.clone()]));
        Ok(())
    }

    /// Replace all children with `nodes`.
    pub fn replace_children(&self, nodes: &[DomNode]) -> Result<(), DomError> {
        for node in nodes {
            self.ensure_can_contain(node)?;
        }
        for child in self.children() {
            self.remove_child(&child)?;
        }
        for node in nodes {
            self.append_child(node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn with_element<R>(&self, f: impl FnOnce(&mut ElementData) -> R) -> Result<R, DomError> {
        match &mut *self.0.data.borrow_mut() {
            NodeData::Element(el) => Ok(f(el)),
            NodeData::Text(_) => Err(DomError::NotAnElement),
        }
    }

    /// Set an attribute. `style` is parsed into style properties.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        self.with_element(|el| {
            if name.eq_ignore_ascii_case("style") {
                el.style = parse_style(value);
            } else if let Some(entry) = el.attributes.iter_mut().find(|(n, _)| n == name) {
                entry.1 = value.to_string();
            } else {
                el.attributes.push((name.to_string(), value.to_string()));
            }
        })?;
        self.notify(&MutationRecord::attribute(self, name));
        Ok(())
    }

    /// Attribute value.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        match &*self.0.data.borrow() {
            NodeData::Element(el) if name.eq_ignore_ascii_case("style") => {
                (!el.style.is_empty()).then(|| serialize_style(&el.style))
            }
            NodeData::Element(el) => el.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()),
            NodeData::Text(_) => None,
        }
    }

    /// Whether the attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Remove an attribute. Removing an absent attribute is not an error.
    pub fn remove_attribute(&self, name: &str) -> Result<(), DomError> {
        let removed = self.with_element(|el| {
            if name.eq_ignore_ascii_case("style") {
                let had = !el.style.is_empty();
                el.style.clear();
                had
            } else {
                let before = el.attributes.len();
                el.attributes.retain(|(n, _)| n != name);
                before != el.attributes.len()
            }
        })?;
        if removed {
            self.notify(&MutationRecord::attribute(self, name));
        }
        Ok(())
    }

    /// All attributes in insertion order (`style` last, when set).
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &*self.0.data.borrow() {
            NodeData::Element(el) => {
                let mut attrs = el.attributes.clone();
                if !el.style.is_empty() {
                    attrs.push(("style".to_string(), serialize_style(&el.style)));
                }
                attrs
            }
            NodeData::Text(_) => Vec::new(),
        }
    }

    // =========================================================================
    // Style
    // =========================================================================

    /// Set one inline style property, keeping the others.
    pub fn set_style_property(&self, property: &str, value: &str) -> Result<(), DomError> {
        self.with_element(|el| {
            if let Some(entry) = el.style.iter_mut().find(|(p, _)| p == property) {
                entry.1 = value.to_string();
            } else {
                el.style.push((property.to_string(), value.to_string()));
            }
        })?;
        self.notify(&MutationRecord::attribute(self, "style"));
        Ok(())
    }

    /// Inline style property value.
    pub fn style_property(&self, property: &str) -> Option<String> {
        match &*self.0.data.borrow() {
            NodeData::Element(el) => el.style.iter().find(|(p, _)| p == property).map(|(_, v)| v.clone()),
            NodeData::Text(_) => None,
        }
    }

    /// Remove one inline style property.
    pub fn remove_style_property(&self, property: &str) -> Result<(), DomError> {
        self.with_element(|el| el.style.retain(|(p, _)| p != property))?;
        self.notify(&MutationRecord::attribute(self, "style"));
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener for `kind` (e.g. `click`).
    pub fn add_event_listener(&self, kind: &str, listener: Listener) -> Result<(), DomError> {
        self.with_element(|el| el.listeners.push((kind.to_ascii_lowercase(), listener)))
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: &str) -> usize {
        match &*self.0.data.borrow() {
            NodeData::Element(el) => el.listeners.iter().filter(|(k, _)| k.eq_ignore_ascii_case(kind)).count(),
            NodeData::Text(_) => 0,
        }
    }

    /// Dispatch an event on this node; it bubbles through the ancestors.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, kind: &str) -> usize {
        let event = Event::new(kind, self.clone());
        let mut invoked = 0;
        let mut cursor = Some(self.clone());

        while let Some(node) = cursor {
            let listeners: Vec<Listener> = match &*node.0.data.borrow() {
                NodeData::Element(el) => el
                    .listeners
                    .iter()
                    .filter(|(k, _)| *k == event.kind())
                    .map(|(_, l)| l.clone())
                    .collect(),
                NodeData::Text(_) => Vec::new(),
            };

            event.set_current_target(node.clone());
            for listener in listeners {
                listener(&event);
                invoked += 1;
            }

            if event.is_propagation_stopped() {
                break;
            }
            cursor = node.parent();
        }

        invoked
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub(crate) fn add_observer(&self, observer: Weak<ObserverInner>) {
        self.0.observers.borrow_mut().push(observer);
    }

    /// Deliver a record to observers on this node and its ancestors.
    fn notify(&self, record: &MutationRecord) {
        let mut delivered: Vec<Rc<ObserverInner>> = Vec::new();
        let mut cursor = Some(self.clone());

        while let Some(node) = cursor {
            node.0.observers.borrow_mut().retain(|weak| weak.strong_count() > 0);
            for observer in node.0.observers.borrow().iter().filter_map(Weak::upgrade) {
                if !delivered.iter().any(|seen| Rc::ptr_eq(seen, &observer)) {
                    observer.push(record);
                    delivered.push(observer);
                }
            }
            cursor = node.parent();
        }
    }

    /// Keep `value` alive until this node is dropped.
    pub(crate) fn retain(&self, value: impl Any) {
        self.0.retained.borrow_mut().push(Box::new(value));
    }

    /// Number of bindings and rendered nodes this node keeps alive.
    pub fn retained_count(&self) -> usize {
        self.0.retained.borrow().len()
    }

    // =========================================================================
    // Serialization helpers
    // =========================================================================

    pub(crate) fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> Option<R> {
        match &*self.0.data.borrow() {
            NodeData::Text(text) => Some(f(text)),
            NodeData::Element(_) => None,
        }
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_node(other)
    }
}

impl Eq for DomNode {}

impl fmt::Debug for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.data.borrow() {
            NodeData::Element(el) => write!(f, "<{}#{}>", el.tag, self.0.id),
            NodeData::Text(text) => write!(f, "#text{}({:?})", self.0.id, text),
        }
    }
}

fn parse_style(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            (!property.is_empty()).then(|| (property.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn serialize_style(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}
