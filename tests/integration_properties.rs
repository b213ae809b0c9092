use proptest::prelude::*;

use term_vtree::{NodeId, TreeConfig, TreeNode, VirtualTree};

fn arb_node() -> impl Strategy<Value = TreeNode> {
    let leaf = "[abc]{1,3}".prop_map(TreeNode::leaf);
    leaf.prop_recursive(4, 80, 5, |inner| {
        (
            "[abc]{1,3}",
            any::<bool>(),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(label, expanded, children)| {
                let node = TreeNode::with_children(label, children);
                if expanded { node.expanded() } else { node }
            })
    })
}

fn arb_root() -> impl Strategy<Value = TreeNode> {
    prop::collection::vec(arb_node(), 0..6)
        .prop_map(|children| TreeNode::with_children("root", children).expanded())
}

fn attach(root: TreeNode, config: TreeConfig) -> VirtualTree {
    let mut tree = VirtualTree::new();
    tree.set_root(root, config).unwrap();
    tree
}

/// The open chain in pre-order, rebuilt from the node links alone.
fn reference_revealed(tree: &VirtualTree) -> Vec<NodeId> {
    fn walk(tree: &VirtualTree, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        if tree.node(id).is_some_and(|n| n.expanded) {
            for &child in tree.children(id) {
                walk(tree, child, out);
            }
        }
    }
    let mut out = Vec::new();
    let Some(root) = tree.root() else {
        return out;
    };
    if tree.config().show_root {
        walk(tree, root, &mut out);
    } else {
        for &child in tree.children(root) {
            walk(tree, child, &mut out);
        }
    }
    out
}

/// Matches plus every listed ancestor of a match, by brute force.
fn reference_filter(tree: &VirtualTree, listed: &[NodeId], needle: &str) -> Vec<NodeId> {
    let depth = |id: NodeId| tree.node(id).map(|n| n.depth).unwrap_or_default();
    let hit = |id: NodeId| tree.label(id).is_some_and(|l| l.contains(needle));
    listed
        .iter()
        .enumerate()
        .filter(|&(i, &id)| {
            hit(id)
                || listed[i + 1..]
                    .iter()
                    .take_while(|&&d| depth(d) > depth(id))
                    .any(|&d| hit(d))
        })
        .map(|(_, &id)| id)
        .collect()
}

fn assert_consistent(tree: &VirtualTree) -> Result<(), TestCaseError> {
    prop_assert_eq!(
        tree.total_content_height_px(),
        tree.display_len() as u64 * u64::from(tree.config().item_height_px)
    );
    for (index, id) in tree.display_list().iter().enumerate() {
        prop_assert_eq!(tree.position_of(*id), Some(index));
    }
    prop_assert!(tree.rendered().count() <= tree.window().slot_count());
    Ok(())
}

proptest! {
    #[test]
    fn window_never_exceeds_slot_count(
        root in arb_root(),
        viewport in 1u32..400,
        item in 1u32..40,
        scroll in 0u64..20_000,
    ) {
        let config = TreeConfig::default()
            .with_viewport_height(viewport)
            .with_item_height(item);
        let mut tree = attach(root, config);
        tree.on_scroll(scroll);
        let slots = tree.window().slot_count();
        prop_assert_eq!(slots, viewport.div_ceil(item) as usize + 2);
        let start = (scroll / u64::from(item)) as usize;
        let expected = slots.min(tree.display_len().saturating_sub(start));
        let rows: Vec<_> = tree.rendered().collect();
        prop_assert_eq!(rows.len(), expected);
        for (offset, row) in rows.iter().enumerate() {
            prop_assert_eq!(row.display_index, start + offset);
            prop_assert_eq!(row.top_px, (start + offset) as u64 * u64::from(item));
        }
    }

    #[test]
    fn toggles_keep_list_equal_to_open_chain(
        root in arb_root(),
        show_root in any::<bool>(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..30),
    ) {
        let mut tree = attach(root, TreeConfig::default().with_show_root(show_root));
        let expected = reference_revealed(&tree);
        prop_assert_eq!(tree.display_list(), expected.as_slice());
        for pick in picks {
            let all = tree.all_nodes();
            let id = all[pick.index(all.len())];
            if !show_root && Some(id) == tree.root() {
                continue;
            }
            tree.toggle(id);
            let expected = reference_revealed(&tree);
            prop_assert_eq!(tree.display_list(), expected.as_slice());
            assert_consistent(&tree)?;
        }
    }

    #[test]
    fn expand_then_collapse_restores_list(
        root in arb_root(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut tree = attach(root, TreeConfig::default());
        let listed = tree.display_list().to_vec();
        let id = listed[pick.index(listed.len())];
        if tree.node(id).is_some_and(|n| n.expanded) {
            tree.collapse(id);
            tree.expand(id);
        } else {
            tree.expand(id);
            tree.collapse(id);
        }
        prop_assert_eq!(tree.display_list(), listed.as_slice());
        assert_consistent(&tree)?;
    }

    #[test]
    fn filter_matches_brute_force_and_clears(
        root in arb_root(),
        show_root in any::<bool>(),
        needle in "[abc]{1,2}",
    ) {
        let mut tree = attach(root, TreeConfig::default().with_show_root(show_root));
        let before = tree.display_list().to_vec();
        tree.filter(&needle);
        let expected = reference_filter(&tree, &before, &needle);
        prop_assert_eq!(tree.display_list(), expected.as_slice());
        assert_consistent(&tree)?;
        tree.filter("");
        prop_assert_eq!(tree.display_list(), before.as_slice());
    }

    #[test]
    fn expanding_under_filter_matches_refiltering(
        root in arb_root(),
        needle in "[abc]{1,2}",
        pick in any::<prop::sample::Index>(),
    ) {
        let mut tree = attach(root, TreeConfig::default());
        tree.filter(&needle);
        let listed = tree.display_list().to_vec();
        prop_assume!(!listed.is_empty());
        let id = listed[pick.index(listed.len())];
        prop_assume!(tree.node(id).is_some_and(|n| !n.expanded));
        tree.expand(id);
        let spliced = tree.display_list().to_vec();
        tree.filter(&needle);
        prop_assert_eq!(tree.display_list(), spliced.as_slice());
        assert_consistent(&tree)?;
    }
}
