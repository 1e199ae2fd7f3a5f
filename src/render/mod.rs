//! Node Reconciler - children to nodes, and in-place patching.
//!
//! ```text
//! Child ──to_node──> Node ──append──> host tree
//!   │                  ▲
//!   └─ Producer ──> context re-runs ──replace_node──┘
//! ```
//!
//! - [`to_node`] - classify a child value
//! - [`replace_node`] - patch rendered output in place
//! - [`set_attribute`] - attribute dispatch by name and value shape
//! - [`create_element`] / [`fragment`] / [`render`] - entry points
//! - [`on_mount`] / [`on_unmount`] - build lifecycle hooks

mod attributes;
mod convert;
mod element;
mod lifecycle;
mod mount;
mod node;
mod reconcile;

pub use attributes::{set_attribute, AttrValue, Binding, RefCallback};
pub use convert::{to_node, Child, Producer};
pub use element::{build_element, create_element, fragment, Component, Props, Tag};
pub use lifecycle::{on_mount, on_unmount};
pub use mount::render;
pub use node::{Node, NodeKind};
pub use reconcile::replace_node;
