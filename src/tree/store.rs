use super::{NodeId, NodeKind, TreeNode};

/// One arena slot.
#[derive(Debug, Clone)]
pub struct StoredNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Ancestor count below the real root (the root itself is 0).
    pub depth: usize,
    pub expanded: bool,
    pub selected: bool,
    /// Cached position in the display list. Always verified before use.
    pub(crate) display_index: Option<usize>,
}

impl StoredNode {
    fn new(kind: NodeKind, parent: Option<NodeId>, depth: usize, expanded: bool) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            depth,
            expanded,
            selected: false,
            display_index: None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.kind.label()
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_placeholder()
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.kind, NodeKind::Content { lazy: true, .. })
    }

    /// Lazy node whose children have not been supplied yet.
    pub fn needs_fetch(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Content {
                lazy: true,
                fetched: false,
                ..
            }
        )
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_toggle(&self) -> bool {
        self.is_lazy() || self.has_children()
    }

    /// True while the node's only child is the loading placeholder.
    pub(crate) fn awaiting_children(&self, store: &NodeStore) -> bool {
        match self.children.as_slice() {
            [only] => store.get(*only).is_some_and(StoredNode::is_placeholder),
            _ => false,
        }
    }
}

/// Arena owning the canonical tree.
///
/// Freed slots are tombstoned rather than reused so stale [`NodeId`]s held by
/// the presentation layer resolve to nothing instead of to a stranger.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<Option<StoredNode>>,
    root: Option<NodeId>,
    live: usize,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.live = 0;
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&StoredNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut StoredNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(StoredNode::label)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Replace whatever is stored with `tree`, returning the new root id.
    pub fn attach_root(&mut self, tree: TreeNode) -> NodeId {
        self.clear();
        let root = self.insert_tree(tree, None, 0);
        self.root = Some(root);
        root
    }

    /// Insert `tree` below `parent` (appending to its children).
    ///
    /// Ids are allocated in pre-order. Uses an explicit stack so very deep
    /// trees cannot overflow the call stack.
    pub fn insert_tree(&mut self, tree: TreeNode, parent: Option<NodeId>, depth: usize) -> NodeId {
        let (top, children) = self.alloc_content(tree, parent, depth);
        let mut stack: Vec<_> = children
            .into_iter()
            .rev()
            .map(|child| (child, top, depth + 1))
            .collect();
        while let Some((node, parent, depth)) = stack.pop() {
            let (id, children) = self.alloc_content(node, Some(parent), depth);
            for child in children.into_iter().rev() {
                stack.push((child, id, depth + 1));
            }
        }
        top
    }

    fn alloc_content(
        &mut self,
        node: TreeNode,
        parent: Option<NodeId>,
        depth: usize,
    ) -> (NodeId, Vec<TreeNode>) {
        let TreeNode {
            label,
            children,
            expanded,
            lazy,
        } = node;
        let kind = NodeKind::Content {
            label,
            lazy,
            // A lazy node handed over with children is already populated.
            fetched: lazy && !children.is_empty(),
        };
        let id = self.alloc(StoredNode::new(kind, parent, depth, expanded));
        if let Some(parent) = parent
            && let Some(p) = self.get_mut(parent)
        {
            p.children.push(id);
        }
        (id, children)
    }

    /// Append a loading placeholder as the sole child of `parent`.
    ///
    /// Callers are expected to have cleared the existing children first.
    pub fn insert_placeholder(&mut self, parent: NodeId) -> Option<NodeId> {
        let depth = self.get(parent)?.depth + 1;
        let id = self.alloc(StoredNode::new(
            NodeKind::LoadingPlaceholder,
            Some(parent),
            depth,
            false,
        ));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Free every descendant of `id`, leaving it childless. Returns how many
    /// nodes were freed.
    pub fn remove_children(&mut self, id: NodeId) -> usize {
        let Some(node) = self.get_mut(id) else {
            return 0;
        };
        let mut pending = std::mem::take(&mut node.children);
        let mut freed = 0;
        while let Some(child) = pending.pop() {
            if let Some(slot) = self.nodes.get_mut(child.0)
                && let Some(removed) = slot.take()
            {
                pending.extend(removed.children);
                freed += 1;
            }
        }
        self.live -= freed;
        freed
    }

    /// Flag a lazy node as populated (or not).
    pub fn set_fetched(&mut self, id: NodeId, value: bool) {
        if let Some(StoredNode {
            kind: NodeKind::Content { lazy: true, fetched, .. },
            ..
        }) = self.get_mut(id)
        {
            *fetched = value;
        }
    }

    fn alloc(&mut self, node: StoredNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        self.live += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::with_children(
            "root",
            vec![
                TreeNode::leaf("a"),
                TreeNode::with_children("b", vec![TreeNode::leaf("b1"), TreeNode::leaf("b2")]),
            ],
        )
    }

    #[test]
    fn attach_assigns_preorder_ids_and_depths() {
        let mut store = NodeStore::new();
        let root = store.attach_root(sample());
        assert_eq!(root, NodeId(0));
        assert_eq!(store.len(), 5);
        let labels: Vec<_> = (0..5).map(|i| store.label(NodeId(i)).unwrap()).collect();
        assert_eq!(labels, ["root", "a", "b", "b1", "b2"]);
        assert_eq!(store.get(NodeId(3)).unwrap().depth, 2);
        assert_eq!(store.children(root), &[NodeId(1), NodeId(2)]);
        assert_eq!(store.get(NodeId(4)).unwrap().parent, Some(NodeId(2)));
    }

    #[test]
    fn remove_children_frees_whole_subtree() {
        let mut store = NodeStore::new();
        let root = store.attach_root(sample());
        assert_eq!(store.remove_children(root), 4);
        assert_eq!(store.len(), 1);
        assert!(!store.contains(NodeId(3)));
        assert!(store.children(root).is_empty());
    }

    #[test]
    fn placeholder_is_sole_child_without_toggle() {
        let mut store = NodeStore::new();
        let root = store.attach_root(TreeNode::new("dir").lazy());
        assert!(store.get(root).unwrap().needs_fetch());
        let ph = store.insert_placeholder(root).unwrap();
        let node = store.get(ph).unwrap();
        assert!(node.is_placeholder());
        assert!(!node.has_toggle());
        assert!(store.get(root).unwrap().awaiting_children(&store));
    }

    #[test]
    fn set_fetched_only_touches_lazy_nodes() {
        let mut store = NodeStore::new();
        let root = store.attach_root(sample());
        store.set_fetched(root, true);
        assert!(matches!(
            store.get(root).unwrap().kind,
            NodeKind::Content { fetched: false, .. }
        ));
    }
}
