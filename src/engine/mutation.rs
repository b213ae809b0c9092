//! Structural edits that patch the display list in place.
//!
//! Each edit touches only the span directly below the affected node and then
//! forces a window recompute. Unknown or freed ids are ignored.

use super::VirtualTree;
use crate::events::TreeEvent;
use crate::tree::TreeNode;
use crate::tree::filter::retain_with_ancestors;
use crate::tree::flatten::revealed_span;
use crate::tree::NodeId;

impl VirtualTree {
    /// Open a closed node or close an open one.
    pub fn toggle(&mut self, id: NodeId) {
        match self.store.get(id) {
            Some(node) if node.is_placeholder() => {}
            Some(node) if node.expanded => self.collapse(id),
            Some(_) => self.expand(id),
            None => tracing::debug!(node = %id, "toggle on unknown node"),
        }
    }

    /// Open `id` and splice its revealed descendants in below it.
    ///
    /// A lazy node that has not been populated yet only flips its state when
    /// lazy loading is enabled; the caller is expected to follow up with
    /// [`Self::show_loading_placeholder`] and [`Self::supply_children`].
    pub fn expand(&mut self, id: NodeId) {
        let lazy_loading = self.config.lazy_loading_enabled;
        let Some(node) = self.store.get_mut(id) else {
            tracing::debug!(node = %id, "expand on unknown node");
            return;
        };
        if node.is_placeholder() || node.expanded {
            return;
        }
        node.expanded = true;
        let deferred = lazy_loading && node.needs_fetch();
        let inserted = if deferred { 0 } else { self.splice_children(id) };
        tracing::debug!(node = %id, inserted, deferred, "expanded");
        self.emit(TreeEvent::NodeOpened(id));
        self.refresh_after_edit();
    }

    /// Close `id`, dropping every deeper row that follows it.
    pub fn collapse(&mut self, id: NodeId) {
        let Some(node) = self.store.get_mut(id) else {
            tracing::debug!(node = %id, "collapse on unknown node");
            return;
        };
        if !node.expanded {
            return;
        }
        node.expanded = false;
        let removed = self.remove_span(id);
        tracing::debug!(node = %id, removed, "collapsed");
        self.emit(TreeEvent::NodeClosed(id));
        self.refresh_after_edit();
    }

    /// Replace the children of `id` with a single loading placeholder.
    pub fn show_loading_placeholder(&mut self, id: NodeId) {
        if !self.is_content(id) {
            return;
        }
        self.remove_span(id);
        self.drop_children(id);
        self.store.insert_placeholder(id);
        let inserted = self.splice_children(id);
        tracing::debug!(node = %id, inserted, "loading placeholder shown");
        self.refresh_after_edit();
    }

    /// Remove the loading placeholder of `id`, if it has one.
    pub fn hide_loading_placeholder(&mut self, id: NodeId) {
        let awaiting = self
            .store
            .get(id)
            .is_some_and(|node| node.awaiting_children(&self.store));
        if !awaiting {
            return;
        }
        self.remove_span(id);
        self.drop_children(id);
        self.refresh_after_edit();
    }

    /// Replace the children of `id`, splicing them in when `id` is open and
    /// listed. Serves both eager edits and completed lazy loads.
    pub fn set_children(&mut self, id: NodeId, children: Vec<TreeNode>) {
        let Some(depth) = self.store.get(id).filter(|n| !n.is_placeholder()).map(|n| n.depth) else {
            tracing::debug!(node = %id, "set_children on unknown node");
            return;
        };
        self.remove_span(id);
        self.drop_children(id);
        let count = children.len();
        for child in children {
            self.store.insert_tree(child, Some(id), depth + 1);
        }
        self.store.set_fetched(id, true);
        let inserted = self.splice_children(id);
        tracing::debug!(node = %id, children = count, inserted, "children set");
        self.refresh_after_edit();
    }

    /// Completion hook for an external lazy load.
    pub fn supply_children(&mut self, id: NodeId, children: Vec<TreeNode>) {
        self.set_children(id, children);
    }

    /// Drop all children of `id`. A lazy node needs fetching again afterwards.
    pub fn remove_children(&mut self, id: NodeId) {
        if !self.is_content(id) {
            return;
        }
        let removed = self.remove_span(id);
        self.drop_children(id);
        self.store.set_fetched(id, false);
        tracing::debug!(node = %id, removed, "children removed");
        self.refresh_after_edit();
    }

    pub fn clear_children(&mut self, id: NodeId) {
        self.remove_children(id);
    }

    fn is_content(&self, id: NodeId) -> bool {
        self.store.get(id).is_some_and(|n| !n.is_placeholder())
    }

    /// Where the children of `id` start in the display list, or `None` when
    /// `id` is open but its span is not displayed.
    fn span_start(&self, id: NodeId) -> Option<usize> {
        if let Some(pos) = self.position_of(id) {
            return Some(pos + 1);
        }
        // A hidden root owns the entire list.
        let hidden_root = !self.config.show_root && self.store.root() == Some(id);
        hidden_root.then_some(0)
    }

    /// Insert the revealed (and filter-passing) descendants of `id` right
    /// after it. Returns how many rows were inserted.
    fn splice_children(&mut self, id: NodeId) -> usize {
        let open = self.store.get(id).is_some_and(|n| n.expanded);
        if !open {
            return 0;
        }
        let Some(at) = self.span_start(id) else {
            return 0;
        };
        let mut span = revealed_span(&self.store, id);
        if let Some(matcher) = self.matcher.as_deref() {
            span = retain_with_ancestors(&self.store, &span, matcher);
        }
        let inserted = span.len();
        self.display.splice(at..at, span);
        self.reindex_from(at);
        inserted
    }

    /// Remove the contiguous run of deeper rows following `id`. Returns how
    /// many rows were removed.
    fn remove_span(&mut self, id: NodeId) -> usize {
        let Some(depth) = self.store.get(id).map(|n| n.depth) else {
            return 0;
        };
        let Some(start) = self.span_start(id) else {
            return 0;
        };
        let len = self.display[start..]
            .iter()
            .take_while(|&&other| self.store.get(other).is_some_and(|n| n.depth > depth))
            .count();
        for id in self.display.drain(start..start + len) {
            if let Some(node) = self.store.get_mut(id) {
                node.display_index = None;
            }
        }
        self.reindex_from(start);
        len
    }

    /// Free the children of `id` from the store, dropping the selection if
    /// it pointed into them.
    fn drop_children(&mut self, id: NodeId) {
        self.store.remove_children(id);
        if let Some(selected) = self.selected
            && !self.store.contains(selected)
        {
            tracing::debug!(node = %selected, "selected node freed");
            self.selected = None;
        }
    }
}
