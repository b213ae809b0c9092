//! Depth-first walks over the [`NodeStore`].
//!
//! All walks use an explicit stack and yield nodes in pre-order, which is the
//! order the display list is kept in.

use super::{NodeId, NodeStore};

/// Every node below and including `root`, regardless of expansion.
pub fn preorder(store: &NodeStore, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !store.contains(id) {
            continue;
        }
        out.push(id);
        stack.extend(store.children(id).iter().rev());
    }
    out
}

/// Nodes that belong in an unfiltered display list for `root`.
///
/// The root is listed only when `show_root` is set; a hidden root acts as
/// the effective root so its children are always revealed.
pub fn revealed(store: &NodeStore, root: NodeId, show_root: bool) -> Vec<NodeId> {
    if !store.contains(root) {
        return Vec::new();
    }
    if show_root {
        let mut out = vec![root];
        if store.get(root).is_some_and(|n| n.expanded) {
            out.extend(revealed_span(store, root));
        }
        out
    } else {
        revealed_span(store, root)
    }
}

/// Descendants of `id` that become listed once `id` is open: its children,
/// and recursively the children of every already-expanded descendant.
pub fn revealed_span(store: &NodeStore, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = store.children(id).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(node) = store.get(id) else {
            continue;
        };
        out.push(id);
        if node.expanded {
            stack.extend(node.children.iter().rev());
        }
    }
    out
}
