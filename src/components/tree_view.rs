use std::time::{Duration, Instant};

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::scroll_view::{ScrollState, ScrollbarDrag, render_scrollbar};
use super::{Component, rect_contains};
use crate::engine::{RenderedNode, VirtualTree};
use crate::keybindings::{Action, KeyBindings};
use crate::tree::NodeId;

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const WHEEL_STEP: isize = 3;

/// Draws a [`VirtualTree`] one terminal row per item.
///
/// The view keeps a keyboard cursor (a display-list index) separate from the
/// engine's selection, and feeds its scroll offset to the engine so only the
/// render window is ever painted.
pub struct TreeViewComponent {
    tree: VirtualTree,
    title: String,
    cursor: usize,
    scroll: ScrollState,
    drag: ScrollbarDrag,
    area: Rect,
    keys: KeyBindings,
    last_click: Option<(NodeId, Instant)>,
    loading_text: String,
}

impl TreeViewComponent {
    pub fn new<T: Into<String>>(title: T, tree: VirtualTree) -> Self {
        Self {
            tree,
            title: title.into(),
            cursor: 0,
            scroll: ScrollState::default(),
            drag: ScrollbarDrag::new(),
            area: Rect::default(),
            keys: KeyBindings::standard(),
            last_click: None,
            loading_text: "Loading...".to_string(),
        }
    }

    /// Text drawn in place of children that are still being fetched.
    pub fn with_loading_text<T: Into<String>>(mut self, text: T) -> Self {
        self.loading_text = text.into();
        self
    }

    pub fn tree(&self) -> &VirtualTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut VirtualTree {
        &mut self.tree
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_node(&self) -> Option<NodeId> {
        self.tree.display_list().get(self.cursor).copied()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll.offset
    }

    /// Put the cursor on `id` if it is listed.
    pub fn focus_node(&mut self, id: NodeId) -> bool {
        match self.tree.position_of(id) {
            Some(pos) => {
                self.cursor = pos;
                true
            }
            None => false,
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.tree.display_len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize).min(len - 1)
        };
    }

    /// Apply a keyboard action to the node under the cursor.
    pub fn apply(&mut self, action: Action) -> bool {
        let page = self.view_rows().max(1) as isize;
        match action {
            Action::CursorUp => self.move_cursor(-1),
            Action::CursorDown => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-page),
            Action::PageDown => self.move_cursor(page),
            Action::Home => self.move_cursor(isize::MIN),
            Action::End => self.move_cursor(isize::MAX),
            Action::Toggle => {
                let Some(id) = self.cursor_node() else {
                    return false;
                };
                self.tree.on_toggle_clicked(id);
            }
            Action::Expand => self.expand_or_descend(),
            Action::Collapse => self.collapse_or_ascend(),
            Action::Select => {
                let Some(id) = self.cursor_node() else {
                    return false;
                };
                self.tree.on_click(id);
            }
            _ => return false,
        }
        self.clamp_cursor();
        true
    }

    fn expand_or_descend(&mut self) {
        let Some(id) = self.cursor_node() else {
            return;
        };
        let Some(node) = self.tree.node(id) else {
            return;
        };
        if node.has_toggle() && !node.expanded {
            self.tree.expand(id);
        } else if node.expanded && node.has_children() {
            self.move_cursor(1);
        }
    }

    fn collapse_or_ascend(&mut self) {
        let Some(id) = self.cursor_node() else {
            return;
        };
        let Some(node) = self.tree.node(id) else {
            return;
        };
        if node.expanded && node.has_toggle() {
            self.tree.collapse(id);
        } else if let Some(parent) = node.parent {
            self.focus_node(parent);
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.tree.display_len().saturating_sub(1));
    }

    fn view_rows(&self) -> usize {
        self.area.height as usize
    }

    fn item_rows(&self) -> u64 {
        u64::from(self.tree.config().item_height_px.max(1))
    }

    fn keep_cursor_in_view(&mut self) {
        let view = self.view_rows();
        if view == 0 {
            return;
        }
        if self.cursor < self.scroll.offset {
            self.scroll.offset = self.cursor;
        } else if self.cursor >= self.scroll.offset + view {
            self.scroll.offset = self.cursor + 1 - view;
        }
    }

    fn sync_scroll(&mut self) {
        let total = self.tree.display_len();
        self.scroll.apply(total, self.view_rows());
        let offset_px = self.scroll.offset as u64 * self.item_rows();
        self.tree.on_scroll(offset_px);
    }

    fn node_at_row(&self, row: u16) -> Option<(NodeId, RenderedNode<'_>)> {
        let index = self.scroll.offset + usize::from(row.checked_sub(self.area.y)?);
        self.tree
            .rendered()
            .find(|node| node.display_index == index)
            .map(|node| (node.id, node))
    }

    fn handle_mouse(&mut self, event: &Event) -> bool {
        let Event::Mouse(mouse) = event else {
            return false;
        };
        let total = self.tree.display_len();
        let view = self.view_rows();
        if let Some(offset) = self.drag.handle_mouse(mouse, self.area, total, view) {
            self.scroll.offset = offset;
            self.sync_scroll();
            return true;
        }
        if self.drag.dragging() {
            return true;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.scroll.bump(-WHEEL_STEP);
                self.sync_scroll();
                true
            }
            MouseEventKind::ScrollDown => {
                self.scroll.bump(WHEEL_STEP);
                self.sync_scroll();
                true
            }
            MouseEventKind::Down(MouseButton::Left)
                if rect_contains(self.area, mouse.column, mouse.row) =>
            {
                let Some((id, row)) = self.node_at_row(mouse.row) else {
                    return false;
                };
                let toggle_col = self.area.x as i64 + indent_cols(&row);
                let display_index = row.display_index;
                let on_toggle = row.has_toggle && i64::from(mouse.column) == toggle_col;
                self.cursor = display_index;
                if on_toggle {
                    self.tree.on_toggle_clicked(id);
                    self.last_click = None;
                } else {
                    let now = Instant::now();
                    let double = self
                        .last_click
                        .is_some_and(|(prev, at)| prev == id && now.duration_since(at) <= DOUBLE_CLICK_WINDOW);
                    if double {
                        self.tree.on_double_click(id);
                        self.last_click = None;
                    } else {
                        self.tree.on_click(id);
                        self.last_click = Some((id, now));
                    }
                }
                self.clamp_cursor();
                true
            }
            _ => false,
        }
    }

    fn render_row(&self, frame: &mut Frame, row: &RenderedNode<'_>, area: Rect) {
        let indent = " ".repeat(indent_cols(row).max(0) as usize);
        let mut spans = vec![Span::raw(indent)];
        if row.loading {
            spans.push(Span::styled(
                format!("  {}", self.loading_text),
                Style::default().fg(crate::theme::loading_fg()),
            ));
        } else {
            let glyph = match (row.has_toggle, row.expanded) {
                (false, _) => "  ",
                (true, true) => "▾ ",
                (true, false) => "▸ ",
            };
            spans.push(Span::styled(
                glyph,
                Style::default().fg(crate::theme::toggle_fg()),
            ));
            spans.push(Span::raw(row.label.unwrap_or_default().to_string()));
        }
        let mut style = Style::default();
        if row.selected {
            style = crate::theme::selected_style();
        }
        if row.display_index == self.cursor {
            style = style.patch(crate::theme::cursor_style());
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).style(style), area);
    }
}

/// Terminal columns of indentation: the engine's pixel indent, one pixel per
/// column.
fn indent_cols(row: &RenderedNode<'_>) -> i64 {
    row.indent_px
}

impl Component for TreeViewComponent {
    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str());
        if focused {
            block = block.border_style(Style::default().fg(crate::theme::border_focused()));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.area = inner;
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let viewport_px = u32::from(inner.height) * self.tree.config().item_height_px;
        self.tree.set_viewport_height(viewport_px);
        self.clamp_cursor();
        self.keep_cursor_in_view();
        self.sync_scroll();

        let rows_area = Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        };
        let first_px = self.scroll.offset as u64 * self.item_rows();
        for row in self.tree.rendered() {
            let rel = (row.top_px.saturating_sub(first_px)) / self.item_rows();
            if rel >= u64::from(rows_area.height) {
                break;
            }
            let line = Rect {
                y: rows_area.y + rel as u16,
                height: 1,
                ..rows_area
            };
            self.render_row(frame, &row, line);
        }

        render_scrollbar(
            frame,
            inner,
            self.tree.display_len(),
            inner.height as usize,
            self.scroll.offset,
        );
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => match self.keys.action_for_key(key) {
                Some(action) => self.apply(action),
                None => false,
            },
            Event::Mouse(_) => self.handle_mouse(event),
            _ => false,
        }
    }
}
