//! Error types.
//!
//! Conversion and patch failures surface as [`Error`]. Host tree failures
//! have their own [`DomError`] so the reconciler can tell "the host tree was
//! tampered with" apart from "the caller asked for something impossible".

use thiserror::Error;

/// Errors raised by the in-memory host tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The reference node is not a child of the node the operation targets.
    #[error("node is not a child of this parent")]
    NotAChild,

    /// The insertion would make a node its own ancestor, or insert into a text node.
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(&'static str),

    /// An element-only operation was attempted on a text node.
    #[error("operation requires an element, found a text node")]
    NotAnElement,
}

/// Errors raised by conversion, reconciliation and element construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A child value is not null, a node, a list, a scalar or a producer.
    #[error("unsupported child kind: {0}")]
    UnsupportedChildKind(String),

    /// A patch could not find a parent to perform the replacement in.
    #[error("no parent found for node replacement")]
    NoParentFound,

    /// An attribute value does not fit the attribute it was assigned to.
    #[error("invalid value for attribute `{name}`: {reason}")]
    InvalidAttribute {
        /// Attribute name as written by the caller.
        name: String,
        /// What was expected.
        reason: &'static str,
    },

    /// A host tree operation failed outside a resilient patch path.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
