use ratatui::style::{Color, Modifier, Style};

// Centralized colors for the tree front-end. Kept as small helpers so the
// palette can change in one place.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

/// Accent color, in truecolor when the terminal advertises it.
pub fn accent() -> Color {
    let truecolor = std::env::var("COLORTERM")
        .map(|v| {
            let v = v.to_lowercase();
            v.contains("truecolor") || v.contains("24bit")
        })
        .unwrap_or(false);
    if truecolor {
        Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
    } else {
        Color::Yellow
    }
}

// Tree rows
pub fn toggle_fg() -> Color {
    Color::Cyan
}
pub fn loading_fg() -> Color {
    Color::DarkGray
}
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(accent())
        .add_modifier(Modifier::BOLD)
}
pub fn cursor_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

// Chrome
pub fn border_focused() -> Color {
    Color::Green
}
pub fn status_style() -> Style {
    Style::default().fg(Color::Black).bg(Color::Gray)
}
pub fn filter_prompt_fg() -> Color {
    accent()
}
pub fn debug_log_fg() -> Color {
    Color::Gray
}
