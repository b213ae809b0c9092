use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::Component;

/// What an edit did to the filter line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInputEvent {
    Changed(String),
    Submitted,
    Cancelled,
}

/// Single-line `/` prompt. `cursor` is a byte offset that always sits on a
/// char boundary.
#[derive(Debug, Default)]
pub struct FilterInputComponent {
    text: String,
    cursor: usize,
    active: bool,
    last_event: Option<FilterInputEvent>,
}

impl FilterInputComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open the prompt, keeping whatever was typed last time.
    pub fn activate(&mut self) {
        self.active = true;
        self.cursor = self.text.len();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn take_event(&mut self) -> Option<FilterInputEvent> {
        self.last_event.take()
    }

    /// Apply one key. Returns `None` for keys the prompt ignores.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<FilterInputEvent> {
        if !self.active {
            return None;
        }
        let changed = match key.code {
            KeyCode::Esc => {
                self.active = false;
                self.clear();
                return Some(FilterInputEvent::Cancelled);
            }
            KeyCode::Enter => {
                self.active = false;
                return Some(FilterInputEvent::Submitted);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            KeyCode::Backspace => match self.prev_boundary() {
                Some(prev) => {
                    self.text.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                    true
                }
                None => false,
            },
            KeyCode::Delete => match self.next_boundary() {
                Some(next) => {
                    self.text.replace_range(self.cursor..next, "");
                    true
                }
                None => false,
            },
            KeyCode::Left => {
                self.cursor = self.prev_boundary().unwrap_or(0);
                false
            }
            KeyCode::Right => {
                self.cursor = self.next_boundary().unwrap_or(self.text.len());
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = self.text.len();
                false
            }
            _ => return None,
        };
        if changed {
            Some(FilterInputEvent::Changed(self.text.clone()))
        } else {
            None
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

impl Component for FilterInputComponent {
    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let line = Line::from(vec![
            Span::styled("/", Style::default().fg(crate::theme::filter_prompt_fg())),
            Span::raw(self.text.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        if focused && self.active {
            let col = 1 + self.text[..self.cursor].chars().count() as u16;
            if col < area.width {
                frame.set_cursor_position(Position::new(area.x + col, area.y));
            }
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if !self.active {
            return false;
        }
        if let Some(ev) = self.handle_key(key) {
            self.last_event = Some(ev);
        }
        true
    }
}
