use crossterm::event::{MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::prelude::Rect;
use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

use super::rect_contains;

/// Row offset with pending deltas that are clamped on the next `apply`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    pub offset: usize,
    pending: isize,
}

impl ScrollState {
    pub fn reset(&mut self) {
        self.offset = 0;
        self.pending = 0;
    }

    pub fn bump(&mut self, delta: isize) {
        self.pending = self.pending.saturating_add(delta);
    }

    pub fn apply(&mut self, total: usize, view: usize) {
        let max_offset = total.saturating_sub(view);
        if self.pending != 0 {
            let delta = self.pending;
            self.pending = 0;
            let next = if delta.is_negative() {
                self.offset.saturating_sub(delta.unsigned_abs())
            } else {
                self.offset.saturating_add(delta as usize)
            };
            self.offset = next.min(max_offset);
        } else if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

/// Click-and-drag tracking for a vertical scrollbar in the rightmost column.
#[derive(Debug, Default, Clone)]
pub struct ScrollbarDrag {
    dragging: bool,
}

impl ScrollbarDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Returns `Some(offset)` when the event grabbed or moved the thumb.
    /// Releases end the drag and return `None`.
    pub fn handle_mouse(
        &mut self,
        mouse: &MouseEvent,
        area: Rect,
        total: usize,
        view: usize,
    ) -> Option<usize> {
        if total <= view || view == 0 || area.height == 0 {
            self.dragging = false;
            return None;
        }
        let scrollbar_x = area.x.saturating_add(area.width.saturating_sub(1));
        let on_scrollbar = rect_contains(area, mouse.column, mouse.row) && mouse.column == scrollbar_x;
        match mouse.kind {
            MouseEventKind::Down(_) if on_scrollbar => {
                self.dragging = true;
                Some(offset_from_row(mouse.row, area, total, view))
            }
            MouseEventKind::Drag(_) if self.dragging => {
                Some(offset_from_row(mouse.row, area, total, view))
            }
            MouseEventKind::Up(_) if self.dragging => {
                self.dragging = false;
                None
            }
            _ => None,
        }
    }
}

pub fn render_scrollbar(frame: &mut Frame, area: Rect, total: usize, view: usize, offset: usize) {
    if total <= view || view == 0 || area.height == 0 || area.width == 0 {
        return;
    }
    let content_len = total.saturating_sub(view).saturating_add(1).max(1);
    let mut state = ScrollbarState::new(content_len)
        .position(offset.min(content_len.saturating_sub(1)))
        .viewport_content_length(view.max(1));
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
    frame.render_stateful_widget(scrollbar, area, &mut state);
}

fn offset_from_row(row: u16, area: Rect, total: usize, view: usize) -> usize {
    let max_offset = total.saturating_sub(view);
    if max_offset == 0 || area.height <= 1 {
        return 0;
    }
    let rel = row
        .saturating_sub(area.y)
        .min(area.height.saturating_sub(1));
    let ratio = rel as f64 / (area.height.saturating_sub(1)) as f64;
    (ratio * max_offset as f64).round() as usize
}
