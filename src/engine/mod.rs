//! The virtualization engine.
//!
//! [`VirtualTree`] owns the canonical tree, the flattened display list, and
//! the render window. Presentation layers feed it scroll offsets and clicks
//! and read back [`RenderedNode`]s plus queued [`TreeEvent`]s.
//!
//! Everything runs synchronously on the caller's thread. Lazy loading is
//! driven from outside: the caller shows a placeholder, fetches however it
//! likes, then calls [`VirtualTree::supply_children`]. Overlapping fetches for
//! the same node are not de-duplicated here.

mod mutation;
mod selection;

use std::collections::VecDeque;

use crate::config::{ConfigError, TreeConfig};
use crate::events::TreeEvent;
use crate::tree::filter::retain_with_ancestors;
use crate::tree::flatten::{self, revealed};
use crate::tree::{LabelMatcher, NodeId, NodeStore, StoredNode, SubstringMatcher, TreeNode};
use crate::window::WindowManager;

/// Display status of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Not part of the display list (collapsed ancestor, filtered, or freed).
    Hidden,
    Collapsed,
    Expanded,
    /// Expanded and waiting on externally supplied children.
    Loading,
}

/// Everything the presentation layer needs to draw one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedNode<'a> {
    pub id: NodeId,
    /// `None` for the loading placeholder.
    pub label: Option<&'a str>,
    pub depth: usize,
    pub indent_px: i64,
    pub display_index: usize,
    pub top_px: u64,
    pub has_toggle: bool,
    pub expanded: bool,
    pub selected: bool,
    pub loading: bool,
}

pub struct VirtualTree {
    config: TreeConfig,
    store: NodeStore,
    display: Vec<NodeId>,
    window: WindowManager,
    matcher: Option<Box<dyn LabelMatcher>>,
    filter_text: String,
    scroll_offset_px: u64,
    selected: Option<NodeId>,
    events: VecDeque<TreeEvent>,
}

impl std::fmt::Debug for VirtualTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualTree")
            .field("nodes", &self.store.len())
            .field("displayed", &self.display.len())
            .field("window", &self.window)
            .field("filter_text", &self.filter_text)
            .field("scroll_offset_px", &self.scroll_offset_px)
            .field("selected", &self.selected)
            .finish()
    }
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTree {
    /// An engine with no root. Renders nothing until [`Self::set_root`].
    pub fn new() -> Self {
        let config = TreeConfig::default();
        Self {
            window: WindowManager::new(config.slot_count(), config.item_height_px),
            config,
            store: NodeStore::new(),
            display: Vec::new(),
            matcher: None,
            filter_text: String::new(),
            scroll_offset_px: 0,
            selected: None,
            events: VecDeque::new(),
        }
    }

    /// Attach a new root, discarding every piece of derived state.
    ///
    /// This is the only O(tree size) operation outside of filtering.
    pub fn set_root(&mut self, root: TreeNode, config: TreeConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.window = WindowManager::new(config.slot_count(), config.item_height_px);
        self.matcher = None;
        self.filter_text.clear();
        self.scroll_offset_px = 0;
        self.selected = None;
        self.events.clear();

        let root_id = self.store.attach_root(root);
        if !config.show_root
            && let Some(node) = self.store.get_mut(root_id)
        {
            // A hidden root can never be clicked closed.
            node.expanded = true;
        }
        self.display = revealed(&self.store, root_id, config.show_root);
        self.reindex_from(0);
        tracing::debug!(
            nodes = self.store.len(),
            displayed = self.display.len(),
            slots = self.window.slot_count(),
            "root attached"
        );
        self.refresh(true);
        Ok(())
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn root(&self) -> Option<NodeId> {
        self.store.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&StoredNode> {
        self.store.get(id)
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.store.label(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.store.children(id)
    }

    /// Every live node in pre-order, listed or not.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.store
            .root()
            .map(|root| flatten::preorder(&self.store, root))
            .unwrap_or_default()
    }

    pub fn display_list(&self) -> &[NodeId] {
        &self.display
    }

    pub fn display_len(&self) -> usize {
        self.display.len()
    }

    pub fn total_content_height_px(&self) -> u64 {
        self.window.content_height_px(self.display.len())
    }

    pub fn scroll_offset_px(&self) -> u64 {
        self.scroll_offset_px
    }

    pub fn max_scroll_offset_px(&self) -> u64 {
        self.window
            .max_scroll_offset_px(self.display.len(), self.config.viewport_height_px)
    }

    pub fn window(&self) -> &WindowManager {
        &self.window
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn is_filtered(&self) -> bool {
        self.matcher.is_some()
    }

    /// Scroll to `offset_px`. Cheap when the first visible row is unchanged.
    pub fn on_scroll(&mut self, offset_px: u64) -> bool {
        self.scroll_offset_px = offset_px;
        self.refresh(false)
    }

    /// Resize the viewport; the slot buffer follows.
    pub fn set_viewport_height(&mut self, viewport_height_px: u32) {
        if self.config.viewport_height_px == viewport_height_px {
            return;
        }
        self.config.viewport_height_px = viewport_height_px;
        self.window.set_slot_count(self.config.slot_count());
        self.refresh(true);
    }

    /// Rows to draw, top to bottom.
    pub fn rendered(&self) -> impl Iterator<Item = RenderedNode<'_>> + '_ {
        self.window.slots().iter().filter_map(|slot| {
            let node = self.store.get(slot.id)?;
            Some(RenderedNode {
                id: slot.id,
                label: node.label(),
                depth: node.depth,
                indent_px: self.indent_px(node.depth),
                display_index: slot.display_index,
                top_px: slot.top_px,
                has_toggle: node.has_toggle(),
                expanded: node.expanded,
                selected: node.selected,
                loading: node.is_placeholder(),
            })
        })
    }

    pub fn node_status(&self, id: NodeId) -> NodeStatus {
        let Some(node) = self.store.get(id) else {
            return NodeStatus::Hidden;
        };
        if self.position_of(id).is_none() {
            return NodeStatus::Hidden;
        }
        if !node.expanded {
            NodeStatus::Collapsed
        } else if node.awaiting_children(&self.store) {
            NodeStatus::Loading
        } else {
            NodeStatus::Expanded
        }
    }

    /// Take queued notifications, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = TreeEvent> + '_ {
        self.events.drain(..)
    }

    /// Filter by substring. Empty text restores the unfiltered list.
    pub fn filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
        if text.is_empty() {
            self.clear_filter();
        } else {
            self.apply_filter(Box::new(SubstringMatcher::new(text)));
        }
    }

    /// Rebuild the display list from the revealed nodes that pass `matcher`
    /// (plus the ancestors that give them context).
    pub fn apply_filter(&mut self, matcher: Box<dyn LabelMatcher>) {
        if matcher.is_trivial() {
            self.clear_filter();
            return;
        }
        let order = self.revealed_order();
        let kept = retain_with_ancestors(&self.store, &order, matcher.as_ref());
        tracing::debug!(candidates = order.len(), kept = kept.len(), "filter applied");
        self.matcher = Some(matcher);
        self.replace_display(kept);
    }

    pub fn clear_filter(&mut self) {
        self.matcher = None;
        self.filter_text.clear();
        let order = self.revealed_order();
        self.replace_display(order);
    }

    /// Locate `id` in the display list, trusting the cached index only after
    /// checking it.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        let cached = self.store.get(id)?.display_index?;
        if self.display.get(cached) == Some(&id) {
            return Some(cached);
        }
        tracing::warn!(node = %id, cached, "stale display index, rescanning");
        self.display.iter().position(|&other| other == id)
    }

    fn indent_px(&self, depth: usize) -> i64 {
        let unit = i64::from(self.config.indent_unit_px);
        let indent = depth as i64 * unit;
        if self.config.show_root {
            indent
        } else {
            indent - unit
        }
    }

    fn revealed_order(&self) -> Vec<NodeId> {
        self.store
            .root()
            .map(|root| revealed(&self.store, root, self.config.show_root))
            .unwrap_or_default()
    }

    fn replace_display(&mut self, next: Vec<NodeId>) {
        for &id in &self.display {
            if let Some(node) = self.store.get_mut(id) {
                node.display_index = None;
            }
        }
        self.display = next;
        self.reindex_from(0);
        self.refresh_after_edit();
    }

    /// Re-stamp cached positions for every entry from `start` on.
    fn reindex_from(&mut self, start: usize) {
        for (index, &id) in self.display.iter().enumerate().skip(start) {
            if let Some(node) = self.store.get_mut(id) {
                node.display_index = Some(index);
            }
        }
    }

    fn refresh(&mut self, force: bool) -> bool {
        self.window
            .recompute(&self.display, self.scroll_offset_px, force)
    }

    /// Forced recompute after the list changed shape. A list that shrank
    /// below the scroll offset pulls the offset back to its last page.
    fn refresh_after_edit(&mut self) {
        let max = self.max_scroll_offset_px();
        if self.scroll_offset_px > max {
            tracing::trace!(from = self.scroll_offset_px, to = max, "scroll clamped");
            self.scroll_offset_px = max;
        }
        self.refresh(true);
    }

    fn emit(&mut self, event: TreeEvent) {
        tracing::debug!(?event, "tree event");
        self.events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn scenario() -> TreeNode {
        TreeNode::with_children(
            "root",
            vec![
                TreeNode::leaf("A"),
                TreeNode::with_children("B", vec![TreeNode::leaf("B1"), TreeNode::leaf("B2")]),
            ],
        )
        .expanded()
    }

    pub(super) fn labels(tree: &VirtualTree) -> Vec<String> {
        tree.display_list()
            .iter()
            .map(|id| tree.label(*id).unwrap_or("<loading>").to_string())
            .collect()
    }

    pub(super) fn find(tree: &VirtualTree, label: &str) -> NodeId {
        tree.all_nodes()
            .into_iter()
            .find(|id| tree.label(*id) == Some(label))
            .unwrap()
    }

    pub(super) fn attached(config: TreeConfig) -> VirtualTree {
        let mut tree = VirtualTree::new();
        tree.set_root(scenario(), config).unwrap();
        tree
    }

    #[test]
    fn unattached_tree_renders_nothing() {
        let tree = VirtualTree::new();
        assert_eq!(tree.rendered().count(), 0);
        assert_eq!(tree.total_content_height_px(), 0);
    }

    #[test]
    fn set_root_lists_open_chain_only() {
        let tree = attached(TreeConfig::default());
        assert_eq!(labels(&tree), ["root", "A", "B"]);
        assert_eq!(tree.total_content_height_px(), 60);
        assert_eq!(tree.window().slot_count(), 7);
        assert_eq!(tree.rendered().count(), 3);
    }

    #[test]
    fn set_root_rejects_zero_item_height() {
        let mut tree = VirtualTree::new();
        let err = tree
            .set_root(scenario(), TreeConfig::default().with_item_height(0))
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroItemHeight);
    }

    #[test]
    fn hidden_root_shifts_indent_left() {
        let tree = attached(TreeConfig::default().with_show_root(false));
        assert_eq!(labels(&tree), ["A", "B"]);
        let rows: Vec<_> = tree.rendered().collect();
        assert_eq!(rows[0].indent_px, 0);
        assert_eq!(rows[0].depth, 1);
        assert!(rows[1].has_toggle);
        assert_eq!(rows[1].top_px, 20);
    }

    #[test]
    fn rows_carry_absolute_offsets_after_scroll() {
        let mut root = TreeNode::new("root").expanded();
        for i in 0..50 {
            root.push(TreeNode::leaf(format!("n{i}")));
        }
        let mut tree = VirtualTree::new();
        tree.set_root(root, TreeConfig::default()).unwrap();
        assert!(tree.on_scroll(205));
        let rows: Vec<_> = tree.rendered().collect();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].display_index, 10);
        assert_eq!(rows[0].top_px, 200);
        assert_eq!(rows[0].label, Some("n9"));
        assert!(!tree.on_scroll(219));
        assert_eq!(tree.max_scroll_offset_px(), 51 * 20 - 100);
    }

    #[test]
    fn shrinking_edit_pulls_scroll_back_into_range() {
        let mut big = TreeNode::new("big").expanded();
        for i in 0..50 {
            big.push(TreeNode::leaf(format!("n{i}")));
        }
        let root = TreeNode::with_children("root", vec![big, TreeNode::leaf("small")]).expanded();
        let mut tree = VirtualTree::new();
        tree.set_root(root, TreeConfig::default()).unwrap();
        assert_eq!(tree.display_len(), 53);
        tree.on_scroll(600);
        assert_eq!(tree.window().start_index(), 30);

        tree.collapse(find(&tree, "big"));
        assert_eq!(tree.display_len(), 3);
        assert_eq!(tree.scroll_offset_px(), 0);
        assert_eq!(tree.rendered().count(), 3);

        // A list that still overflows keeps its last page in view.
        tree.expand(find(&tree, "big"));
        tree.on_scroll(1_000);
        tree.filter("n4");
        assert_eq!(tree.display_len(), 13);
        assert_eq!(labels(&tree)[..3], ["root", "big", "n4"]);
        assert_eq!(tree.scroll_offset_px(), 13 * 20 - 100);
        assert_eq!(tree.rendered().last().and_then(|row| row.label), Some("n49"));
    }

    #[test]
    fn filter_keeps_match_and_ancestors() {
        let mut tree = attached(TreeConfig::default());
        let b = find(&tree, "B");
        tree.expand(b);
        tree.filter("B1");
        assert_eq!(labels(&tree), ["root", "B", "B1"]);
        tree.filter("");
        assert_eq!(labels(&tree), ["root", "A", "B", "B1", "B2"]);
        assert!(!tree.is_filtered());
    }

    #[test]
    fn filter_never_reveals_collapsed_nodes() {
        let mut tree = attached(TreeConfig::default());
        tree.filter("B1");
        assert!(tree.display_list().is_empty());
        assert_eq!(tree.rendered().count(), 0);
        assert_eq!(tree.total_content_height_px(), 0);
    }

    #[test]
    fn viewport_resize_changes_capacity() {
        let mut root = TreeNode::new("root").expanded();
        for i in 0..30 {
            root.push(TreeNode::leaf(format!("n{i}")));
        }
        let mut tree = VirtualTree::new();
        tree.set_root(root, TreeConfig::default()).unwrap();
        assert_eq!(tree.rendered().count(), 7);
        tree.set_viewport_height(200);
        assert_eq!(tree.rendered().count(), 12);
    }

    #[test]
    fn stale_cached_index_is_recovered() {
        let mut tree = attached(TreeConfig::default());
        let b = find(&tree, "B");
        tree.store.get_mut(b).unwrap().display_index = Some(0);
        assert_eq!(tree.position_of(b), Some(2));
    }
}
