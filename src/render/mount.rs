//! Mounting into an existing host element.

use crate::dom::DomNode;
use crate::error::Result;

use super::convert::{to_node, Child};
use super::node::Node;

/// Convert `input` and append the resulting node to `root`.
///
/// Returns the mounted node. For a producer this is the stable handle that
/// keeps following the producer's output.
///
/// ```ignore
/// let root = DomNode::element("main");
/// let (name, set_name) = create_cell("world".to_string());
/// render(&root, Child::producer(move || format!("hello {}", name.get())))?;
/// set_name.set("there".into());
/// assert_eq!(root.text_content(), "hello there");
/// ```
pub fn render(root: &DomNode, input: impl Into<Child>) -> Result<Node> {
    let node = to_node(input.into())?;
    node.append_to(root)?;
    tracing::debug!(root = root.id(), reactive = node.is_reactive(), "mounted");
    Ok(node)
}
