//! Host DOM - an in-memory element tree.
//!
//! The renderer writes into this tree the way a browser binding would write
//! into a document: elements, text nodes, attributes, inline styles and event
//! listeners, with browser move semantics on insertion.
//!
//! - [`DomNode`] - element or text node handle
//! - [`MutationObserver`] - change log over a subtree
//! - [`outer_html`] / [`inner_html`] - serialization for tests and debugging

mod event;
mod html;
mod mutation;
mod node;

pub use event::{Event, Listener};
pub use html::{escape_html, inner_html, outer_html};
pub use mutation::{MutationKind, MutationObserver, MutationRecord};
pub use node::{DomNode, Namespace, WeakDomNode};

/// SVG namespace URI.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// HTML namespace URI.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
