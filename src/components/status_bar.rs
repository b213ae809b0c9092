use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

/// One-line bar with left-aligned status and right-aligned hints.
pub struct StatusBar {
    left: String,
    right: String,
    style: Style,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            style: crate::theme::status_style(),
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect, _focused: bool) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let area = Rect { height: 1, ..area };
        frame.render_widget(Paragraph::new("").style(self.style), area);
        let width = area.width as usize;
        let right_width = self.right.chars().count();
        if !self.right.is_empty() && right_width + self.left.chars().count() < width {
            frame.render_widget(
                Paragraph::new(self.right.as_str())
                    .style(self.style)
                    .alignment(Alignment::Right),
                area,
            );
        }
        let left: String = self.left.chars().take(width).collect();
        let left_area = Rect {
            width: left.chars().count() as u16,
            ..area
        };
        frame.render_widget(Paragraph::new(left).style(self.style), left_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Component;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(bar: &mut StatusBar, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 1)).unwrap();
        terminal
            .draw(|frame| bar.render(frame, frame.area(), false))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..width).map(|x| buffer[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn left_and_right_text() {
        let mut bar = StatusBar::new();
        bar.set_left("12 rows");
        bar.set_right("q quit");
        assert_eq!(rendered(&mut bar, 20), "12 rows       q quit");
    }

    #[test]
    fn right_text_yields_to_left() {
        let mut bar = StatusBar::default();
        bar.set_left("a long status line");
        bar.set_right("hints");
        assert_eq!(rendered(&mut bar, 10), "a long sta");
        assert_eq!(bar.left(), "a long status line");
    }
}
