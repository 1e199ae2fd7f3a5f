//! # spark-dom
//!
//! Fine-grained reactive rendering into a DOM-like tree.
//!
//! Element descriptions are compiled once into host nodes. Reactive children
//! (producers) and attribute bindings are re-run when the cells they read
//! change, and their output is patched into the tree in place.
//!
//! ## Architecture
//!
//! ```text
//! create_cell ──> Getter::get registers the running Context
//!       │
//! Setter::set ──> Context re-runs ──> producer output ──> replace_node ──> host tree
//! ```
//!
//! Everything is single-threaded and synchronous. Runtime state (the active
//! context stack, root contexts, lifecycle hooks, settings) is thread-local.
//!
//! ## Modules
//!
//! - [`reactive`] - cells, contexts, derived values
//! - [`dom`] - the in-memory host tree
//! - [`render`] - child conversion, reconciliation, elements, mounting
//! - [`config`] - runtime settings
//! - [`error`] - error types
//!
//! ## Example
//!
//! ```ignore
//! use spark_dom::{create_cell, render, Child, DomNode};
//!
//! let root = DomNode::element("main");
//! let (count, set_count) = create_cell(0);
//! render(&root, Child::producer(move || count.get()))?;
//!
//! set_count.set(1);
//! assert_eq!(root.text_content(), "1");
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod render;

pub use error::{DomError, Error, Result};

pub use config::{config, reset_config, set_config, with_config, Config};

pub use dom::{
    escape_html, inner_html, outer_html, DomNode, Event, Listener, MutationKind, MutationObserver,
    MutationRecord, Namespace,
};

pub use reactive::{
    create_cell, current_context, derive, on_cleanup, reset_runtime, root_count, run_reactive,
    run_reactive_named, untracked, Context, Getter, Setter,
};

pub use render::{
    build_element, create_element, fragment, on_mount, on_unmount, render, replace_node,
    set_attribute, to_node, AttrValue, Child, Component, Node, NodeKind, Props, Tag,
};
