//! Child values and their conversion into nodes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dom::DomNode;
use crate::error::{Error, Result};
use crate::reactive::run_reactive_unrooted;

use super::lifecycle::{self, Hook};
use super::node::{Node, WeakNode};
use super::reconcile::replace_node;

/// A zero-argument function whose output is rendered reactively.
pub type Producer = Rc<dyn Fn() -> Result<Child>>;

/// Anything that can appear as a child.
#[derive(Clone)]
pub enum Child {
    /// Renders nothing.
    Null,
    /// An already rendered node, passed through unchanged.
    Node(Node),
    /// A host node, wrapped as a plain node.
    Dom(DomNode),
    /// Nested children, flattened into one fragment.
    List(Vec<Child>),
    /// Text.
    Text(String),
    /// Integer, rendered as text.
    Int(i64),
    /// Float, rendered as text.
    Float(f64),
    /// Boolean, rendered as `true` / `false`.
    Bool(bool),
    /// Reactive content.
    Producer(Producer),
    /// A value that cannot be rendered. Conversion fails with its debug form.
    Opaque(Rc<dyn fmt::Debug>),
}

impl Child {
    /// A producer child from an infallible closure.
    pub fn producer<F, C>(f: F) -> Self
    where
        F: Fn() -> C + 'static,
        C: Into<Child>,
    {
        Child::Producer(Rc::new(move || Ok(f().into())))
    }

    /// A producer child from a fallible closure.
    pub fn try_producer<F, C>(f: F) -> Self
    where
        F: Fn() -> Result<C> + 'static,
        C: Into<Child>,
    {
        Child::Producer(Rc::new(move || f().map(Into::into)))
    }

    /// Wrap an arbitrary value (conversion of it will fail).
    pub fn opaque(value: impl fmt::Debug + 'static) -> Self {
        Child::Opaque(Rc::new(value))
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Null => f.write_str("Null"),
            Child::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Child::Dom(dom) => f.debug_tuple("Dom").field(dom).finish(),
            Child::List(items) => f.debug_tuple("List").field(items).finish(),
            Child::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Child::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Child::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Child::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Child::Producer(_) => f.write_str("Producer(..)"),
            Child::Opaque(value) => f.debug_tuple("Opaque").field(value).finish(),
        }
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Null
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(n: $ty) -> Self {
                Child::Int(i64::from(n))
            }
        })*
    };
}

// Values that may not fit an `i64` keep their exact digits as text.
macro_rules! impl_from_wide_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(n: $ty) -> Self {
                i64::try_from(n).map_or_else(|_| Child::Text(n.to_string()), Child::Int)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);
impl_from_wide_int!(u64, usize, isize);

impl From<f32> for Child {
    fn from(n: f32) -> Self {
        Child::Float(f64::from(n))
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Child::Float(n)
    }
}

impl From<bool> for Child {
    fn from(b: bool) -> Self {
        Child::Bool(b)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<DomNode> for Child {
    fn from(dom: DomNode) -> Self {
        Child::Dom(dom)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Null, Into::into)
    }
}

/// Convert a child into exactly one node.
///
/// Lists are flattened (nested lists and `Null` entries disappear) and an
/// empty result is an empty node. A producer becomes a node that updates in
/// place whenever the cells the producer read change.
///
/// # Errors
///
/// [`Error::UnsupportedChildKind`] for [`Child::Opaque`], anywhere in the
/// tree, including the first output of a producer.
pub fn to_node(child: Child) -> Result<Node> {
    match child {
        Child::Null => Ok(Node::empty()),
        Child::Node(node) => Ok(node),
        Child::Dom(dom) => Ok(Node::plain(dom)),
        Child::List(items) => Ok(Node::fragment(flatten(items)?)),
        Child::Text(text) => Ok(Node::text(text)),
        Child::Int(n) => Ok(Node::text(n.to_string())),
        Child::Float(n) => Ok(Node::text(n.to_string())),
        Child::Bool(b) => Ok(Node::text(b.to_string())),
        Child::Producer(producer) => reactive_node(producer),
        Child::Opaque(value) => Err(Error::UnsupportedChildKind(format!("{value:?}"))),
    }
}

/// Convert list items depth-first, skipping `Null` and expanding sublists.
pub(crate) fn flatten(items: Vec<Child>) -> Result<Vec<Node>> {
    let mut stack: Vec<Child> = items.into_iter().rev().collect();
    let mut nodes = Vec::with_capacity(stack.len());

    while let Some(item) = stack.pop() {
        match item {
            Child::Null => {}
            Child::List(inner) => stack.extend(inner.into_iter().rev()),
            other => nodes.push(to_node(other)?),
        }
    }

    Ok(nodes)
}

/// Run `producer` in its own context and return a node that follows it.
///
/// The returned node owns the context. At top level nothing else does, so
/// dropping the node (or the host element it was appended to) stops it.
fn reactive_node(producer: Producer) -> Result<Node> {
    let first: Rc<RefCell<Option<Result<Node>>>> = Rc::new(RefCell::new(None));
    let unmount: Rc<RefCell<Vec<Hook>>> = Rc::new(RefCell::new(Vec::new()));
    let handle: Rc<RefCell<Option<WeakNode>>> = Rc::new(RefCell::new(None));

    let context = {
        let first = first.clone();
        let unmount = unmount.clone();
        let handle = handle.clone();

        run_reactive_unrooted("producer", move || {
            let (output, hooks) = lifecycle::collect(|| producer().and_then(to_node));

            let current = handle.borrow().clone();
            let Some(weak) = current else {
                // First run: the handle is created below, once the context exists.
                if output.is_ok() {
                    let previous = std::mem::replace(&mut *unmount.borrow_mut(), hooks.unmount);
                    lifecycle::run_hooks(previous);
                    lifecycle::run_hooks(hooks.mount);
                }
                *first.borrow_mut() = Some(output);
                return;
            };
            let Some(node) = weak.upgrade() else {
                tracing::trace!("producer node dropped; skipping recomputation");
                return;
            };

            let next = match output {
                Ok(next) => next,
                Err(err) => {
                    tracing::error!(%err, "recomputation aborted; keeping previous output");
                    return;
                }
            };

            match replace_node(&node, &next, None) {
                Ok(_) => {}
                Err(Error::NoParentFound) => {
                    tracing::debug!("producer output not attached yet; adopting new output in place");
                    node.set_kind(next.effective_kind());
                }
                Err(err) => {
                    // The previous build is still on screen and keeps its
                    // unmount hooks; the new build is discarded unmounted.
                    tracing::error!(%err, "patch failed; keeping previous output");
                    return;
                }
            }

            let previous = std::mem::replace(&mut *unmount.borrow_mut(), hooks.unmount);
            lifecycle::run_hooks(previous);
            lifecycle::run_hooks(hooks.mount);
        })
    };

    let output = first.borrow_mut().take().unwrap_or_else(|| Ok(Node::empty()));
    let first = match output {
        Ok(node) => node,
        Err(err) => {
            context.dispose();
            return Err(err);
        }
    };

    // Swap the first output for a handle owned by the context, so later runs
    // patch a node that never changes identity.
    let node = Node::owned_by(context.clone(), first.effective_kind());
    *handle.borrow_mut() = Some(node.downgrade());

    context.on_dispose(move || {
        let hooks = std::mem::take(&mut *unmount.borrow_mut());
        lifecycle::run_hooks(hooks);
    });

    Ok(node)
}
