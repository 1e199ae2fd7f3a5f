//! Mutation observation.
//!
//! A [`MutationObserver`] watches a node and its whole subtree and keeps a
//! log of the structural, attribute and text changes that happen there. The
//! reconciler's "touch as little as possible" promises are checked against
//! this log.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::node::DomNode;

bitflags::bitflags! {
    /// Kinds of host tree mutation.
    ///
    /// Combine with bitwise OR: `MutationKind::CHILD_LIST | MutationKind::ATTRIBUTES`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MutationKind: u8 {
        /// Children added or removed.
        const CHILD_LIST = 1 << 0;
        /// Attribute or style property changed.
        const ATTRIBUTES = 1 << 1;
        /// Text node content changed.
        const CHARACTER_DATA = 1 << 2;
    }
}

/// One observed change.
#[derive(Clone)]
pub struct MutationRecord {
    /// Exactly one flag.
    pub kind: MutationKind,
    /// Node whose children, attributes or data changed.
    pub target: DomNode,
    /// Children inserted by a `CHILD_LIST` change.
    pub added: Vec<DomNode>,
    /// Children removed by a `CHILD_LIST` change.
    pub removed: Vec<DomNode>,
    /// Attribute name of an `ATTRIBUTES` change.
    pub attribute: Option<String>,
}

impl MutationRecord {
    pub(crate) fn child_list(target: &DomNode, added: Vec<DomNode>, removed: Vec<DomNode>) -> Self {
        Self {
            kind: MutationKind::CHILD_LIST,
            target: target.clone(),
            added,
            removed,
            attribute: None,
        }
    }

    pub(crate) fn attribute(target: &DomNode, name: &str) -> Self {
        Self {
            kind: MutationKind::ATTRIBUTES,
            target: target.clone(),
            added: Vec::new(),
            removed: Vec::new(),
            attribute: Some(name.to_string()),
        }
    }

    pub(crate) fn character_data(target: &DomNode) -> Self {
        Self {
            kind: MutationKind::CHARACTER_DATA,
            target: target.clone(),
            added: Vec::new(),
            removed: Vec::new(),
            attribute: None,
        }
    }
}

impl fmt::Debug for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationRecord")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("added", &self.added.len())
            .field("removed", &self.removed.len())
            .field("attribute", &self.attribute)
            .finish()
    }
}

pub(crate) struct ObserverInner {
    kinds: MutationKind,
    records: RefCell<Vec<MutationRecord>>,
}

impl ObserverInner {
    pub(crate) fn push(&self, record: &MutationRecord) {
        if self.kinds.contains(record.kind) {
            self.records.borrow_mut().push(record.clone());
        }
    }
}

/// Records mutations of the observed subtrees.
#[derive(Clone)]
pub struct MutationObserver(Rc<ObserverInner>);

impl MutationObserver {
    /// Create an observer interested in `kinds`.
    pub fn new(kinds: MutationKind) -> Self {
        Self(Rc::new(ObserverInner {
            kinds,
            records: RefCell::new(Vec::new()),
        }))
    }

    /// Start watching `node` and everything below it.
    pub fn observe(&self, node: &DomNode) {
        node.add_observer(Rc::downgrade(&self.0));
    }

    /// Drain the recorded mutations.
    pub fn take_records(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut *self.0.records.borrow_mut())
    }

    /// Number of mutations recorded since the last drain.
    pub fn record_count(&self) -> usize {
        self.0.records.borrow().len()
    }
}

impl fmt::Debug for MutationObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationObserver")
            .field("kinds", &self.0.kinds)
            .field("records", &self.record_count())
            .finish()
    }
}
