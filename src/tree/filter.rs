//! Label predicates and the ancestor-preserving reduction used for filtering.

use super::{NodeId, NodeStore};

/// Decides whether a label passes the active filter.
pub trait LabelMatcher {
    fn matches(&self, label: &str) -> bool;

    /// A matcher that accepts everything, letting callers skip the reduction.
    fn is_trivial(&self) -> bool {
        false
    }
}

impl<F> LabelMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, label: &str) -> bool {
        self(label)
    }
}

/// Plain substring search. An empty needle matches every label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringMatcher {
    needle: String,
    ignore_case: bool,
}

impl SubstringMatcher {
    pub fn new<T: Into<String>>(needle: T) -> Self {
        Self {
            needle: needle.into(),
            ignore_case: false,
        }
    }

    pub fn case_insensitive<T: Into<String>>(needle: T) -> Self {
        Self {
            needle: needle.into().to_lowercase(),
            ignore_case: true,
        }
    }
}

impl LabelMatcher for SubstringMatcher {
    fn matches(&self, label: &str) -> bool {
        if self.ignore_case {
            label.to_lowercase().contains(&self.needle)
        } else {
            label.contains(&self.needle)
        }
    }

    fn is_trivial(&self) -> bool {
        self.needle.is_empty()
    }
}

/// Reduce a pre-order sequence to the matching nodes plus every ancestor of
/// a kept node, preserving order.
///
/// Walks backwards remembering the depth of the most recently kept node. In
/// reverse pre-order the first earlier node that is shallower than a node is
/// its parent, so a non-matching node shallower than that depth is the
/// nearest ancestor still missing. Loading placeholders are always kept.
pub fn retain_with_ancestors(
    store: &NodeStore,
    order: &[NodeId],
    matcher: &dyn LabelMatcher,
) -> Vec<NodeId> {
    if matcher.is_trivial() {
        return order.to_vec();
    }
    let mut kept = Vec::new();
    let mut kept_depth: Option<usize> = None;
    for &id in order.iter().rev() {
        let Some(node) = store.get(id) else {
            continue;
        };
        let hit = match node.label() {
            Some(label) => matcher.matches(label),
            None => true,
        };
        let ancestor = kept_depth.is_some_and(|d| node.depth < d);
        if hit || ancestor {
            kept.push(id);
            kept_depth = Some(node.depth);
        }
    }
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;
    use crate::tree::flatten::preorder;

    fn labels(store: &NodeStore, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| store.label(*id).unwrap_or("<loading>").to_string())
            .collect()
    }

    fn store_for(tree: TreeNode) -> (NodeStore, Vec<NodeId>) {
        let mut store = NodeStore::new();
        let root = store.attach_root(tree);
        let order = preorder(&store, root);
        (store, order)
    }

    #[test]
    fn keeps_ancestors_of_deep_matches() {
        let (store, order) = store_for(TreeNode::with_children(
            "root",
            vec![
                TreeNode::with_children("x", vec![TreeNode::leaf("x1")]),
                TreeNode::with_children(
                    "b",
                    vec![TreeNode::with_children("c", vec![TreeNode::leaf("needle")])],
                ),
                TreeNode::leaf("needle-top"),
            ],
        ));
        let kept = retain_with_ancestors(&store, &order, &SubstringMatcher::new("needle"));
        assert_eq!(labels(&store, &kept), ["root", "b", "c", "needle", "needle-top"]);
    }

    #[test]
    fn deeper_match_after_shallow_one_still_gets_its_parents() {
        let (store, order) = store_for(TreeNode::with_children(
            "root",
            vec![
                TreeNode::with_children(
                    "p",
                    vec![TreeNode::with_children("q", vec![TreeNode::leaf("hit")])],
                ),
                TreeNode::leaf("hit2"),
            ],
        ));
        let kept = retain_with_ancestors(&store, &order, &SubstringMatcher::new("hit"));
        assert_eq!(labels(&store, &kept), ["root", "p", "q", "hit", "hit2"]);
    }

    #[test]
    fn no_match_yields_empty() {
        let (store, order) = store_for(TreeNode::with_children("r", vec![TreeNode::leaf("a")]));
        let kept = retain_with_ancestors(&store, &order, &SubstringMatcher::new("zzz"));
        assert!(kept.is_empty());
    }

    #[test]
    fn closures_and_case_folding() {
        let (store, order) = store_for(TreeNode::with_children(
            "Root",
            vec![TreeNode::leaf("Alpha"), TreeNode::leaf("beta")],
        ));
        let kept = retain_with_ancestors(&store, &order, &SubstringMatcher::case_insensitive("ALP"));
        assert_eq!(labels(&store, &kept), ["Root", "Alpha"]);
        let starts_with_b = |label: &str| label.starts_with('b');
        let kept = retain_with_ancestors(&store, &order, &starts_with_b);
        assert_eq!(labels(&store, &kept), ["Root", "beta"]);
    }
}
