use crossterm::event::Event;
use ratatui::Frame;
use ratatui::layout::Rect;

pub mod debug_log;
pub mod filter_input;
pub mod scroll_view;
pub mod status_bar;
pub mod tree_view;

pub use debug_log::DebugLogComponent;
pub use filter_input::{FilterInputComponent, FilterInputEvent};
pub use scroll_view::{ScrollState, ScrollbarDrag, render_scrollbar};
pub use status_bar::StatusBar;
pub use tree_view::TreeViewComponent;

pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }
}

pub(crate) fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyComp;
    impl Component for DummyComp {
        fn render(&mut self, _frame: &mut Frame, _area: Rect, _focused: bool) {}
    }

    #[test]
    fn default_handle_event_returns_false() {
        let mut d = DummyComp;
        assert!(!d.handle_event(&Event::Key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('a'),
            crossterm::event::KeyModifiers::NONE
        ))));
    }

    #[test]
    fn rect_contains_edge_cases() {
        assert!(!rect_contains(Rect::new(0, 0, 0, 3), 0, 0));
        let r = Rect::new(1, 1, 2, 2);
        assert!(rect_contains(r, 1, 1));
        assert!(!rect_contains(r, 3, 1));
    }
}
