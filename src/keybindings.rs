use std::collections::BTreeMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Quit,
    // Cursor movement
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    Home,
    End,
    // Tree edits
    Toggle,
    Expand,
    Collapse,
    Select,
    Reload,
    // Filtering
    StartFilter,
    ClearFilter,
    ToggleLog,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::CursorUp => "Cursor up",
            Action::CursorDown => "Cursor down",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::Home => "Jump to top",
            Action::End => "Jump to end",
            Action::Toggle => "Open / close node",
            Action::Expand => "Open node",
            Action::Collapse => "Close node",
            Action::Select => "Select node",
            Action::Reload => "Reload children",
            Action::StartFilter => "Filter",
            Action::ClearFilter => "Clear filter",
            Action::ToggleLog => "Toggle debug log",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::PageUp => f.write_str("PgUp"),
            KeyCode::PageDown => f.write_str("PgDn"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Action → key table. Several combos may trigger the same action.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: BTreeMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Arrow keys plus vi-style aliases.
    pub fn standard() -> Self {
        use Action::*;
        let mut kb = Self::empty();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        kb.add(Quit, KeyCombo::plain(KeyCode::Char('q')));
        kb.add(CursorUp, KeyCombo::plain(KeyCode::Up));
        kb.add(CursorUp, KeyCombo::plain(KeyCode::Char('k')));
        kb.add(CursorDown, KeyCombo::plain(KeyCode::Down));
        kb.add(CursorDown, KeyCombo::plain(KeyCode::Char('j')));
        kb.add(PageUp, KeyCombo::plain(KeyCode::PageUp));
        kb.add(PageDown, KeyCombo::plain(KeyCode::PageDown));
        kb.add(Home, KeyCombo::plain(KeyCode::Home));
        kb.add(Home, KeyCombo::plain(KeyCode::Char('g')));
        kb.add(End, KeyCombo::plain(KeyCode::End));
        kb.add(End, KeyCombo::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
        kb.add(Toggle, KeyCombo::plain(KeyCode::Enter));
        kb.add(Expand, KeyCombo::plain(KeyCode::Right));
        kb.add(Expand, KeyCombo::plain(KeyCode::Char('l')));
        kb.add(Collapse, KeyCombo::plain(KeyCode::Left));
        kb.add(Collapse, KeyCombo::plain(KeyCode::Char('h')));
        kb.add(Select, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(Reload, KeyCombo::plain(KeyCode::Char('r')));
        kb.add(StartFilter, KeyCombo::plain(KeyCode::Char('/')));
        kb.add(ClearFilter, KeyCombo::plain(KeyCode::Esc));
        kb.add(ToggleLog, KeyCombo::plain(KeyCode::F(2)));
        kb
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, list)| list.iter().any(|c| c.matches(key)))
            .map(|(action, _)| *action)
    }

    /// First combo for `action`, formatted for hints in the status bar.
    pub fn hint(&self, action: Action) -> Option<String> {
        self.map
            .get(&action)
            .and_then(|list| list.first())
            .map(KeyCombo::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bindings_resolve() {
        let kb = KeyBindings::standard();
        let ev = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::Quit, &ev));
        let ev = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(kb.action_for_key(&ev), Some(Action::CursorDown));
        let ev = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(kb.action_for_key(&ev), None);
    }

    #[test]
    fn hints_are_readable() {
        let kb = KeyBindings::standard();
        assert_eq!(kb.hint(Action::Select).as_deref(), Some("Space"));
        assert_eq!(kb.hint(Action::Quit).as_deref(), Some("Ctrl+q"));
        assert_eq!(kb.hint(Action::ToggleLog).as_deref(), Some("F2"));
        assert_eq!(Action::StartFilter.to_string(), "Filter");
    }
}
