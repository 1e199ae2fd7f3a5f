//! Rendered nodes.
//!
//! A [`Node`] is the rendered counterpart of a child value. It is a shared
//! handle: reconciliation rewrites the handle's kind in place, so whoever
//! holds a node (a parent fragment, a producer, the caller of `render`)
//! always sees the current content.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dom::{DomNode, WeakDomNode};
use crate::error::Result;
use crate::reactive::Context;

/// What a node renders as.
#[derive(Clone)]
pub enum NodeKind {
    /// Nothing. The empty text node holds the position in the host tree.
    Empty(DomNode),
    /// A text leaf converted from a scalar.
    Text(DomNode),
    /// Ordered members placed directly into the parent. Never empty.
    Fragment(Vec<Node>),
    /// A host node created elsewhere (an element, or a caller's text node).
    Plain(DomNode),
}

impl NodeKind {
    /// The single host node of a non-fragment kind.
    pub fn host(&self) -> Option<&DomNode> {
        match self {
            NodeKind::Empty(dom) | NodeKind::Text(dom) | NodeKind::Plain(dom) => Some(dom),
            NodeKind::Fragment(_) => None,
        }
    }

    /// Empty, or a fragment whose members are all empty-equivalent nodes.
    pub fn is_empty_equivalent(&self) -> bool {
        match self {
            NodeKind::Empty(_) => true,
            NodeKind::Fragment(members) => members.iter().all(Node::is_empty_equivalent),
            NodeKind::Text(_) | NodeKind::Plain(_) => false,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            NodeKind::Empty(_) => "empty",
            NodeKind::Text(_) => "text",
            NodeKind::Fragment(_) => "fragment",
            NodeKind::Plain(_) => "plain",
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Fragment(members) => f.debug_tuple("Fragment").field(members).finish(),
            other => match other.host() {
                Some(dom) => f.debug_tuple(other.name()).field(dom).finish(),
                None => f.write_str(other.name()),
            },
        }
    }
}

struct NodeInner {
    kind: NodeKind,
    attachment: WeakDomNode,
    owner: Option<Context>,
}

/// Handle to a rendered node.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeInner>>);

/// Non-owning node handle, held by the producer that keeps it up to date.
#[derive(Clone)]
pub(crate) struct WeakNode(Weak<RefCell<NodeInner>>);

impl WeakNode {
    pub(crate) fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeInner {
            kind,
            attachment: WeakDomNode::default(),
            owner: None,
        })))
    }

    /// An empty node with a fresh placeholder.
    pub fn empty() -> Self {
        Self::from_kind(NodeKind::Empty(DomNode::text("")))
    }

    /// A text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Text(DomNode::text(content)))
    }

    /// Wrap a host node.
    pub fn plain(dom: DomNode) -> Self {
        Self::from_kind(NodeKind::Plain(dom))
    }

    /// Group members. An empty list collapses to [`Node::empty`].
    pub fn fragment(members: Vec<Node>) -> Self {
        if members.is_empty() {
            Self::empty()
        } else {
            Self::from_kind(NodeKind::Fragment(members))
        }
    }

    pub(crate) fn owned_by(context: Context, kind: NodeKind) -> Self {
        let node = Self::from_kind(kind);
        node.0.borrow_mut().owner = Some(context);
        node
    }

    /// Current kind (a snapshot; the handle may be rewritten later).
    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    pub(crate) fn set_kind(&self, kind: NodeKind) {
        self.0.borrow_mut().kind = kind;
    }

    /// Whether both handles are the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    /// Context that keeps this node up to date, for nodes made by a producer.
    pub fn owner(&self) -> Option<Context> {
        self.0.borrow().owner.clone()
    }

    /// Whether a producer owns this node.
    pub fn is_reactive(&self) -> bool {
        self.0.borrow().owner.is_some()
    }

    /// Whether this is an empty node.
    pub fn is_empty(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Empty(_))
    }

    /// Whether this is a fragment.
    pub fn is_fragment(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Fragment(_))
    }

    /// Empty, or a fragment of empty-equivalent members.
    ///
    /// A producer's node is never empty-equivalent, even while its current
    /// output is empty: it can fill up later and has to be in the tree then.
    pub fn is_empty_equivalent(&self) -> bool {
        !self.is_reactive() && self.kind().is_empty_equivalent()
    }

    /// Fragment members (empty for other kinds).
    pub fn members(&self) -> Vec<Node> {
        match &self.0.borrow().kind {
            NodeKind::Fragment(members) => members.clone(),
            _ => Vec::new(),
        }
    }

    /// Content of a text leaf.
    pub fn text_content(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Text(dom) => Some(dom.text_content()),
            _ => None,
        }
    }

    /// Host nodes in document order, fragments flattened.
    pub fn dom_nodes(&self) -> Vec<DomNode> {
        let mut out = Vec::new();
        self.collect_dom_nodes(&mut out);
        out
    }

    fn collect_dom_nodes(&self, out: &mut Vec<DomNode>) {
        match self.kind() {
            NodeKind::Fragment(members) => {
                for member in &members {
                    member.collect_dom_nodes(out);
                }
            }
            kind => out.extend(kind.host().cloned()),
        }
    }

    /// First host node.
    pub fn first_dom_node(&self) -> Option<DomNode> {
        self.dom_nodes().into_iter().next()
    }

    /// Recorded attachment point, if it is still alive.
    pub fn attachment(&self) -> Option<DomNode> {
        self.0.borrow().attachment.upgrade()
    }

    /// Record `parent` as the attachment point of this node and its members.
    pub(crate) fn set_attachment(&self, parent: &DomNode) {
        self.0.borrow_mut().attachment = parent.downgrade();
        for member in self.members() {
            member.set_attachment(parent);
        }
    }

    /// The kind another node should take when it is replaced by this one.
    ///
    /// A producer's node keeps changing after it is handed out, so it is
    /// referenced as a one-member fragment instead of copied.
    pub(crate) fn effective_kind(&self) -> NodeKind {
        if self.is_reactive() {
            NodeKind::Fragment(vec![self.clone()])
        } else {
            self.kind()
        }
    }

    /// Whether `other` can stand in for this node without touching the host.
    pub(crate) fn same_as(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.is_reactive() || other.is_reactive() {
            return false;
        }
        match (self.kind(), other.kind()) {
            (NodeKind::Empty(_), NodeKind::Empty(_)) => true,
            (NodeKind::Text(a), NodeKind::Text(b)) => a == b || a.text_content() == b.text_content(),
            (NodeKind::Plain(a), NodeKind::Plain(b)) => a == b,
            (NodeKind::Fragment(a), NodeKind::Fragment(b)) => {
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.same_as(y))
            }
            _ => false,
        }
    }

    /// Whether this node or one of its members is kept up to date by a producer.
    pub(crate) fn holds_reactive(&self) -> bool {
        self.is_reactive() || self.members().iter().any(Node::holds_reactive)
    }

    /// Append the host nodes to `parent`.
    ///
    /// Producers inside this node live as long as `parent` does.
    pub(crate) fn append_to(&self, parent: &DomNode) -> Result<()> {
        for dom in self.dom_nodes() {
            parent.append_child(&dom)?;
        }
        self.set_attachment(parent);
        if self.holds_reactive() {
            parent.retain(self.clone());
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        let mut out = f.debug_struct("Node");
        out.field("kind", &inner.kind);
        if let Some(owner) = &inner.owner {
            out.field("owner", &owner.id());
        }
        out.finish()
    }
}
