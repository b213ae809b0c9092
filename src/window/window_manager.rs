use std::ops::Range;

use super::RenderSlot;
use crate::tree::NodeId;

/// Tracks which slice of the display list is currently rendered.
///
/// The slot buffer is allocated once per configuration and refilled in place,
/// so a scroll step costs O(slot_count) no matter how long the list is.
#[derive(Debug)]
pub struct WindowManager {
    slots: Vec<RenderSlot>,
    slot_count: usize,
    item_height_px: u64,
    start_index: Option<usize>,
}

impl WindowManager {
    pub fn new(slot_count: usize, item_height_px: u32) -> Self {
        Self {
            slots: Vec::with_capacity(slot_count),
            slot_count,
            item_height_px: u64::from(item_height_px.max(1)),
            start_index: None,
        }
    }

    /// Change capacity (e.g. the viewport was resized). The next
    /// `recompute` must be forced to pick up the new size.
    pub fn set_slot_count(&mut self, slot_count: usize) {
        self.slot_count = slot_count;
        self.slots.truncate(slot_count);
        self.slots
            .reserve(slot_count.saturating_sub(self.slots.len()));
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn item_height_px(&self) -> u64 {
        self.item_height_px
    }

    pub fn start_index(&self) -> usize {
        self.start_index.unwrap_or(0)
    }

    pub fn slots(&self) -> &[RenderSlot] {
        &self.slots
    }

    /// How many slots hold a node. Below capacity near the end of the list.
    pub fn filled(&self) -> usize {
        self.slots.len()
    }

    /// Display-list indices currently rendered.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.start_index();
        start..start + self.slots.len()
    }

    /// Largest useful scroll offset for a list of `len` entries and a
    /// viewport of `viewport_px`.
    pub fn max_scroll_offset_px(&self, len: usize, viewport_px: u32) -> u64 {
        self.content_height_px(len)
            .saturating_sub(u64::from(viewport_px))
    }

    pub fn content_height_px(&self, len: usize) -> u64 {
        len as u64 * self.item_height_px
    }

    /// Refill the slots for `scroll_offset_px`.
    ///
    /// Returns `false` without touching anything when the first visible
    /// index is unchanged and `force` is not set, so sub-item scroll deltas
    /// cost nothing.
    pub fn recompute(&mut self, display: &[NodeId], scroll_offset_px: u64, force: bool) -> bool {
        let start = usize::try_from(scroll_offset_px / self.item_height_px).unwrap_or(usize::MAX);
        if !force && self.start_index == Some(start) {
            return false;
        }
        self.start_index = Some(start);
        self.slots.clear();
        if let Some(visible) = display.get(start..) {
            let item = self.item_height_px;
            self.slots.extend(
                visible
                    .iter()
                    .take(self.slot_count)
                    .enumerate()
                    .map(|(offset, &id)| {
                        let display_index = start + offset;
                        RenderSlot {
                            id,
                            display_index,
                            top_px: display_index as u64 * item,
                        }
                    }),
            );
        }
        tracing::trace!(start_index = start, filled = self.slots.len(), force, "window recomputed");
        true
    }
}
