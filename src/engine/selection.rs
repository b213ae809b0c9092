use super::VirtualTree;
use crate::events::TreeEvent;
use crate::tree::NodeId;

impl VirtualTree {
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Move the single selection to `id`.
    ///
    /// Placeholders are never selectable, and nodes with children only when
    /// the select-parent policy allows it. Re-selecting the current node is a
    /// no-op, so `SelectionChanged` fires only on an actual change.
    pub fn select_item(&mut self, id: NodeId) -> bool {
        let Some(node) = self.store.get(id) else {
            return false;
        };
        if node.is_placeholder() || (node.has_children() && !self.config.select_parent_allowed) {
            return false;
        }
        if self.selected == Some(id) {
            return false;
        }
        if let Some(previous) = self.selected.take()
            && let Some(prev) = self.store.get_mut(previous)
        {
            prev.selected = false;
        }
        if let Some(node) = self.store.get_mut(id) {
            node.selected = true;
        }
        self.selected = Some(id);
        self.emit(TreeEvent::SelectionChanged(id));
        true
    }

    pub fn clear_selection(&mut self) {
        if let Some(previous) = self.selected.take()
            && let Some(prev) = self.store.get_mut(previous)
        {
            prev.selected = false;
        }
    }

    pub fn on_click(&mut self, id: NodeId) -> bool {
        self.select_item(id)
    }

    /// Double clicking a node with children opens or closes it.
    pub fn on_double_click(&mut self, id: NodeId) {
        if self.store.get(id).is_some_and(|n| n.has_children()) {
            self.toggle(id);
        }
    }

    pub fn on_toggle_clicked(&mut self, id: NodeId) {
        self.toggle(id);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{attached, find};
    use crate::config::TreeConfig;
    use crate::events::TreeEvent;

    #[test]
    fn selecting_same_leaf_twice_emits_once() {
        let mut tree = attached(TreeConfig::default());
        let a = find(&tree, "A");
        assert!(tree.on_click(a));
        assert!(!tree.on_click(a));
        let events: Vec<_> = tree.drain_events().collect();
        assert_eq!(events, [TreeEvent::SelectionChanged(a)]);
        assert!(tree.rendered().any(|row| row.id == a && row.selected));
    }

    #[test]
    fn parents_need_policy() {
        let mut tree = attached(TreeConfig::default());
        let b = find(&tree, "B");
        assert!(!tree.select_item(b));
        assert_eq!(tree.selected(), None);

        let mut tree = attached(TreeConfig::default().with_select_parent(true));
        let b = find(&tree, "B");
        assert!(tree.select_item(b));
        assert_eq!(tree.selected(), Some(b));
    }

    #[test]
    fn selection_moves_and_clears_previous_flag() {
        let mut tree = attached(TreeConfig::default().with_select_parent(true));
        let a = find(&tree, "A");
        let b = find(&tree, "B");
        tree.select_item(a);
        tree.select_item(b);
        assert!(!tree.node(a).unwrap().selected);
        assert!(tree.node(b).unwrap().selected);
        tree.clear_selection();
        assert!(!tree.node(b).unwrap().selected);
        assert_eq!(tree.drain_events().count(), 2);
    }

    #[test]
    fn double_click_toggles_parents_only() {
        let mut tree = attached(TreeConfig::default());
        let a = find(&tree, "A");
        let b = find(&tree, "B");
        tree.on_double_click(a);
        assert_eq!(tree.display_len(), 3);
        tree.on_double_click(b);
        assert_eq!(tree.display_len(), 5);
        tree.on_toggle_clicked(b);
        assert_eq!(tree.display_len(), 3);
    }
}
