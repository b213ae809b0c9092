pub mod filter;
pub mod flatten;
pub mod store;

pub use filter::{LabelMatcher, SubstringMatcher};
pub use store::{NodeStore, StoredNode};

use std::fmt;

/// Stable handle to a node in the [`NodeStore`] arena.
///
/// Ids are never reused while the same root is attached, so a handle to a
/// freed node simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an arena slot holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Content {
        label: String,
        /// Children come from an external fetch.
        lazy: bool,
        /// Children have been supplied for a lazy node.
        fetched: bool,
    },
    /// Synthetic sole child shown while a lazy fetch is in flight.
    LoadingPlaceholder,
}

impl NodeKind {
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::Content { label, .. } => Some(label),
            NodeKind::LoadingPlaceholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, NodeKind::LoadingPlaceholder)
    }
}

/// Caller-owned tree description handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
    pub expanded: bool,
    pub lazy: bool,
}

impl TreeNode {
    pub fn new<T: Into<String>>(label: T) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn leaf<T: Into<String>>(label: T) -> Self {
        Self::new(label)
    }

    pub fn with_children<T: Into<String>>(label: T, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
            ..Self::default()
        }
    }

    pub fn expanded(mut self) -> Self {
        self.expanded = true;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn push(&mut self, child: TreeNode) {
        self.children.push(child);
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}
