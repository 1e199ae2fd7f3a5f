//! In-place patching of rendered nodes.
//!
//! ```text
//! replace_node(prev, next)
//!   ├── prev is next / both empty-equivalent / structurally equal  → nothing
//!   ├── locate parent  (known → recorded attachment → live parent → stale record)
//!   ├── fragment ⇄ fragment  → keep matching prefix, drop rest, insert new tail
//!   ├── fragment ⇄ single    → splice host nodes
//!   └── single ⇄ single      → one host replace
//! ```
//!
//! The result is always `prev`, rewritten to describe the new content, so a
//! handle given out earlier stays valid.

use crate::dom::DomNode;
use crate::error::{Error, Result};

use super::node::{Node, NodeKind};

/// Replace `prev` with `next` in the host tree, touching as few host nodes
/// as possible.
///
/// `known_parent` skips the parent lookup. Returns `prev`, which now
/// describes `next`'s content.
///
/// # Errors
///
/// [`Error::NoParentFound`] when `prev` was never attached, and
/// [`Error::Dom`] when the new content cannot live under the parent.
pub fn replace_node(prev: &Node, next: &Node, known_parent: Option<&DomNode>) -> Result<Node> {
    // `prev` is compared by content: it may be the handle of the producer
    // being patched. `next` is compared as it would be placed.
    if prev.same_as(next) || (prev.kind().is_empty_equivalent() && next.effective_kind().is_empty_equivalent()) {
        tracing::trace!("replace skipped: content unchanged");
        return Ok(prev.clone());
    }

    let parent = find_parent(prev, known_parent).ok_or(Error::NoParentFound)?;

    match (prev.kind(), next.effective_kind()) {
        (NodeKind::Fragment(old), NodeKind::Fragment(new)) => patch_members(prev, &old, new, &parent)?,
        (old @ NodeKind::Fragment(_), new) | (old, new @ NodeKind::Fragment(_)) => {
            let old_hosts = hosts_of(&old);
            splice_hosts(&parent, &old_hosts, &old_hosts, &hosts_of(&new))?;
            prev.set_kind(new);
        }
        (old, new) => replace_single(prev, &old, new, &parent)?,
    }

    prev.set_attachment(&parent);
    Ok(prev.clone())
}

/// Host parent of `node`.
fn find_parent(node: &Node, known: Option<&DomNode>) -> Option<DomNode> {
    if let Some(parent) = known {
        return Some(parent.clone());
    }

    let hosts = node.dom_nodes();
    let recorded = node.attachment();
    if let Some(recorded) = &recorded {
        if hosts.iter().any(|host| host.parent().as_ref() == Some(recorded)) {
            return Some(recorded.clone());
        }
    }

    if let Some(live) = hosts.iter().find_map(DomNode::parent) {
        return Some(live);
    }

    recorded
}

fn hosts_of(kind: &NodeKind) -> Vec<DomNode> {
    match kind {
        NodeKind::Fragment(members) => members.iter().flat_map(Node::dom_nodes).collect(),
        other => other.host().cloned().into_iter().collect(),
    }
}

fn replace_single(prev: &Node, old: &NodeKind, new: NodeKind, parent: &DomNode) -> Result<()> {
    let (Some(old_host), Some(new_host)) = (old.host(), new.host()) else {
        return Ok(());
    };

    if old_host.parent().as_ref() == Some(parent) {
        parent.replace_child(new_host, old_host)?;
    } else {
        tracing::warn!(
            parent = parent.id(),
            node = old_host.id(),
            "previous node is no longer under its parent; appending instead"
        );
        parent.append_child(new_host)?;
    }

    prev.set_kind(new);
    Ok(())
}

/// Fragment to fragment: keep the longest matching prefix of members.
fn patch_members(prev: &Node, old: &[Node], new: Vec<Node>, parent: &DomNode) -> Result<()> {
    let keep = old.iter().zip(&new).take_while(|(o, n)| o.same_as(n)).count();

    let old_hosts: Vec<DomNode> = old.iter().flat_map(Node::dom_nodes).collect();
    let removed: Vec<DomNode> = old[keep..].iter().flat_map(Node::dom_nodes).collect();
    let inserted: Vec<DomNode> = new[keep..].iter().flat_map(Node::dom_nodes).collect();

    tracing::trace!(keep, removed = removed.len(), inserted = inserted.len(), "patch fragment members");
    splice_hosts(parent, &old_hosts, &removed, &inserted)?;

    let members: Vec<Node> = old[..keep].iter().cloned().chain(new.into_iter().skip(keep)).collect();
    prev.set_kind(NodeKind::Fragment(members));
    Ok(())
}

/// Remove `removed` and insert `inserted` where `old` used to end.
///
/// Host nodes that appear in both lists are moved, not removed.
fn splice_hosts(parent: &DomNode, old: &[DomNode], removed: &[DomNode], inserted: &[DomNode]) -> Result<()> {
    let anchor = anchor_after(parent, old, inserted);
    if anchor.is_none() && !old.is_empty() && old.iter().all(|host| host.parent().as_ref() != Some(parent)) {
        tracing::warn!(parent = parent.id(), "previous nodes are no longer under their parent; appending instead");
    }

    for host in removed.iter().filter(|host| !inserted.contains(host)) {
        if host.parent().as_ref() == Some(parent) {
            parent.remove_child(host)?;
        } else {
            tracing::warn!(parent = parent.id(), node = host.id(), "node already detached; skipping removal");
        }
    }

    for host in inserted {
        let anchor = anchor.as_ref().filter(|anchor| anchor.parent().as_ref() == Some(parent));
        parent.insert_before(host, anchor)?;
    }
    Ok(())
}

/// First sibling after the last attached old host node that is not itself
/// part of the patch. `None` means append.
fn anchor_after(parent: &DomNode, old: &[DomNode], inserted: &[DomNode]) -> Option<DomNode> {
    let last = old.iter().rev().find(|host| host.parent().as_ref() == Some(parent))?;
    let mut cursor = last.next_sibling();
    while let Some(node) = &cursor {
        if !old.contains(node) && !inserted.contains(node) {
            break;
        }
        cursor = node.next_sibling();
    }
    cursor
}
