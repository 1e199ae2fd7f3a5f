//! Element construction - native tags, components and fragments.

use std::fmt;
use std::rc::Rc;

use crate::dom::{DomNode, Namespace};
use crate::error::Result;

use super::attributes::{set_attribute, AttrValue};
use super::convert::{flatten, to_node, Child};
use super::node::Node;

/// A component: props and children in, renderable output out.
pub type Component = Rc<dyn Fn(&Props, &[Child]) -> Result<Child>>;

/// What [`create_element`] builds.
#[derive(Clone)]
pub enum Tag {
    /// A native element by tag name.
    Native(String),
    /// A component, re-rendered in place when the cells it reads change.
    Component(Component),
}

impl Tag {
    /// A component tag from a closure.
    pub fn component<F, C>(f: F) -> Self
    where
        F: Fn(&Props, &[Child]) -> Result<C> + 'static,
        C: Into<Child>,
    {
        Tag::Component(Rc::new(move |props: &Props, children: &[Child]| f(props, children).map(Into::into)))
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Native(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Native(name)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Native(name) => f.debug_tuple("Native").field(name).finish(),
            Tag::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// Attributes, in the order given, plus the children handed to a component.
#[derive(Clone, Default, Debug)]
pub struct Props {
    attrs: Vec<(String, AttrValue)>,
    children: Vec<Child>,
}

impl Props {
    /// No attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Value of the last attribute called `name`.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Text form of a scalar attribute.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            AttrValue::Text(text) => Some(text.clone()),
            AttrValue::Int(n) => Some(n.to_string()),
            AttrValue::Float(n) => Some(n.to_string()),
            AttrValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Attributes in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Children passed to [`create_element`] (set for components).
    pub fn children(&self) -> &[Child] {
        &self.children
    }
}

/// Build a native element: attributes first, then children in order.
///
/// Lists among the children are expanded in place with an explicit
/// work-list, so deeply nested lists do not grow the call stack.
///
/// # Errors
///
/// Attribute and conversion errors propagate; the partly built element is
/// dropped.
pub fn build_element(tag: &str, attrs: &[(String, AttrValue)], children: Vec<Child>) -> Result<DomNode> {
    let element = if tag.eq_ignore_ascii_case("svg") {
        DomNode::element_ns(Namespace::Svg, tag)
    } else {
        DomNode::element(tag)
    };

    for (name, value) in attrs {
        set_attribute(&element, name, value.clone())?;
    }

    let mut work: Vec<Child> = children.into_iter().rev().collect();
    while let Some(child) = work.pop() {
        match child {
            Child::List(items) => work.extend(items.into_iter().rev()),
            Child::Null => {}
            other => to_node(other)?.append_to(&element)?,
        }
    }

    tracing::trace!(tag, id = element.id(), "element built");
    Ok(element)
}

/// Build a node from a tag or component.
///
/// A native tag is built once. A component is called inside a producer, so
/// its output is patched in place whenever a cell it read changes. The
/// component sees `children` both as its argument and as
/// [`Props::children`].
pub fn create_element(tag: impl Into<Tag>, props: Props, children: Vec<Child>) -> Result<Node> {
    match tag.into() {
        Tag::Native(name) => Ok(Node::plain(build_element(&name, &props.attrs, children)?)),
        Tag::Component(component) => {
            let props = Props { children: children.clone(), ..props };
            to_node(Child::try_producer(move || component(&props, &children)))
        }
    }
}

/// Convert children into sibling nodes without a wrapping element.
///
/// Nested lists are flattened and `Null` entries dropped. `props` is
/// accepted for call-site symmetry with [`create_element`] and is unused.
pub fn fragment(_props: Props, children: Vec<Child>) -> Result<Vec<Node>> {
    flatten(children)
}
