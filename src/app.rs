//! The terminal front-end: one tree pane, a filter prompt, an optional log
//! pane and a status line, wired to a [`FsLoader`] for lazy directories.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use crossterm::event::Event;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::components::{
    Component, DebugLogComponent, FilterInputComponent, FilterInputEvent, StatusBar,
    TreeViewComponent,
};
use crate::config::TreeConfig;
use crate::engine::VirtualTree;
use crate::event_loop::ControlFlow;
use crate::events::TreeEvent;
use crate::keybindings::{Action, KeyBindings};
use crate::loader::{self, FsLoader, LoadError};
use crate::tree::{NodeId, TreeNode};

const LOG_PANE_HEIGHT: u16 = 8;

/// Where the tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    Path(PathBuf),
    Synthetic { nodes: usize, fanout: usize },
}

impl TreeSource {
    fn build_root(&self, lazy: bool) -> Result<TreeNode, LoadError> {
        match self {
            TreeSource::Path(path) => loader::fs_root(path, lazy),
            TreeSource::Synthetic { nodes, fanout } => {
                Ok(loader::synthetic_tree(*nodes, *fanout))
            }
        }
    }

    fn title(&self) -> String {
        match self {
            TreeSource::Path(path) => path.display().to_string(),
            TreeSource::Synthetic { nodes, fanout } => {
                format!("synthetic ({nodes} nodes, fanout {fanout})")
            }
        }
    }
}

pub struct App {
    source: TreeSource,
    view: TreeViewComponent,
    filter: FilterInputComponent,
    status: StatusBar,
    log: DebugLogComponent,
    show_log: bool,
    log_area: Rect,
    keys: KeyBindings,
    loader: Option<FsLoader>,
    in_flight: HashSet<NodeId>,
}

impl App {
    pub fn new(source: TreeSource, config: TreeConfig, log: DebugLogComponent) -> io::Result<Self> {
        let lazy = config.lazy_loading_enabled;
        let root = source.build_root(lazy).map_err(io::Error::other)?;
        let mut tree = VirtualTree::new();
        tree.set_root(root, config).map_err(io::Error::other)?;
        let loader = match &source {
            TreeSource::Path(_) if lazy => Some(FsLoader::spawn()),
            _ => None,
        };
        let mut app = Self {
            view: TreeViewComponent::new(source.title(), tree),
            source,
            filter: FilterInputComponent::new(),
            status: StatusBar::new(),
            log,
            show_log: false,
            log_area: Rect::default(),
            keys: KeyBindings::standard(),
            loader,
            in_flight: HashSet::new(),
        };
        app.refresh_status();
        Ok(app)
    }

    /// Text shown under a directory while its listing is in flight.
    pub fn with_loading_text<T: Into<String>>(mut self, text: T) -> Self {
        self.view = self.view.with_loading_text(text);
        self
    }

    pub fn tree(&self) -> &VirtualTree {
        self.view.tree()
    }

    pub fn view(&self) -> &TreeViewComponent {
        &self.view
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn show_log(&self) -> bool {
        self.show_log
    }

    /// Directory listings still on the worker thread.
    pub fn pending_loads(&self) -> usize {
        self.in_flight.len()
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        let flow = self.dispatch(event);
        self.process_tree_events();
        self.refresh_status();
        flow
    }

    fn dispatch(&mut self, event: &Event) -> ControlFlow {
        if self.filter.is_active() && self.filter.handle_event(event) {
            self.apply_filter_event();
            return ControlFlow::Continue;
        }
        match event {
            Event::Key(key) => match self.keys.action_for_key(key) {
                Some(Action::Quit) => return ControlFlow::Quit,
                Some(Action::StartFilter) => self.filter.activate(),
                Some(Action::ClearFilter) => {
                    self.filter.clear();
                    self.view.tree_mut().clear_filter();
                }
                Some(Action::ToggleLog) => self.show_log = !self.show_log,
                Some(Action::Reload) => self.reload_cursor(),
                _ => {
                    self.view.handle_event(event);
                }
            },
            Event::Mouse(mouse) => {
                let in_log = self.show_log
                    && crate::components::rect_contains(self.log_area, mouse.column, mouse.row);
                if in_log {
                    self.log.handle_event(event);
                } else {
                    self.view.handle_event(event);
                }
            }
            _ => {}
        }
        ControlFlow::Continue
    }

    fn apply_filter_event(&mut self) {
        match self.filter.take_event() {
            Some(FilterInputEvent::Changed(text)) => self.view.tree_mut().filter(&text),
            Some(FilterInputEvent::Cancelled) => self.view.tree_mut().clear_filter(),
            Some(FilterInputEvent::Submitted) | None => {}
        }
    }

    /// Pick up finished listings. Called once per loop iteration.
    pub fn tick(&mut self) {
        let mut finished = Vec::new();
        if let Some(worker) = &self.loader {
            while let Some(result) = worker.try_recv() {
                finished.push(result);
            }
        }
        if finished.is_empty() {
            return;
        }
        for result in finished {
            self.in_flight.remove(&result.node);
            match result.children {
                Ok(children) => {
                    tracing::debug!(
                        node = %result.node,
                        path = %result.path.display(),
                        children = children.len(),
                        "listing arrived"
                    );
                    self.view.tree_mut().supply_children(result.node, children);
                }
                Err(err) => {
                    tracing::warn!(
                        node = %result.node,
                        path = %result.path.display(),
                        %err,
                        "listing failed"
                    );
                    self.view.tree_mut().hide_loading_placeholder(result.node);
                }
            }
        }
        self.process_tree_events();
        self.refresh_status();
    }

    fn process_tree_events(&mut self) {
        let events: Vec<TreeEvent> = self.view.tree_mut().drain_events().collect();
        for event in events {
            match event {
                TreeEvent::NodeOpened(id) => {
                    let needs_fetch = self.tree().node(id).is_some_and(|n| n.needs_fetch());
                    if needs_fetch && self.tree().config().lazy_loading_enabled {
                        self.request_children(id);
                    }
                }
                TreeEvent::NodeClosed(id) => tracing::trace!(node = %id, "closed"),
                TreeEvent::SelectionChanged(id) => {
                    tracing::info!(node = %id, label = ?self.tree().label(id), "selected");
                }
            }
        }
    }

    /// Show a placeholder under `id` and ask the worker for its listing.
    /// A node already being listed only gets its placeholder back.
    fn request_children(&mut self, id: NodeId) {
        let TreeSource::Path(base) = &self.source else {
            return;
        };
        let Some(worker) = &self.loader else {
            return;
        };
        if self.in_flight.contains(&id) {
            self.view.tree_mut().show_loading_placeholder(id);
            return;
        }
        let Some(path) = loader::path_of(self.view.tree(), base, id) else {
            return;
        };
        match worker.request(id, path) {
            Ok(()) => {
                self.in_flight.insert(id);
                self.view.tree_mut().show_loading_placeholder(id);
            }
            Err(err) => tracing::warn!(node = %id, %err, "cannot queue listing"),
        }
    }

    /// Drop the cursor node's children and list it again if it is open.
    fn reload_cursor(&mut self) {
        let Some(id) = self.view.cursor_node() else {
            return;
        };
        let Some(node) = self.tree().node(id) else {
            return;
        };
        if !node.is_lazy() || self.in_flight.contains(&id) {
            return;
        }
        let expanded = node.expanded;
        self.view.tree_mut().remove_children(id);
        if expanded {
            self.request_children(id);
        }
    }

    fn refresh_status(&mut self) {
        let tree = self.view.tree();
        let mut left = format!(" {} of {} rows", tree.display_len(), tree.store().len());
        if tree.is_filtered() {
            left.push_str(&format!(" | filter: {}", tree.filter_text()));
        }
        if let Some(label) = tree.selected().and_then(|id| tree.label(id)) {
            left.push_str(&format!(" | selected: {label}"));
        }
        if !self.in_flight.is_empty() {
            left.push_str(&format!(" | loading {}", self.in_flight.len()));
        }
        self.status.set_left(left);
        let hints: Vec<String> = [Action::Quit, Action::StartFilter, Action::Reload, Action::ToggleLog]
            .into_iter()
            .filter_map(|action| Some(format!("{} {action}", self.keys.hint(action)?)))
            .collect();
        self.status.set_right(format!("{} ", hints.join("  ")));
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let show_prompt = self.filter.is_active() || !self.filter.text().is_empty();
        let mut constraints = vec![Constraint::Min(3)];
        if show_prompt {
            constraints.push(Constraint::Length(1));
        }
        if self.show_log {
            constraints.push(Constraint::Length(LOG_PANE_HEIGHT));
        }
        constraints.push(Constraint::Length(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(frame.area());

        let mut next = chunks.iter().copied();
        let tree_area = next.next().unwrap_or_default();
        let filter_active = self.filter.is_active();
        self.view.render(frame, tree_area, !filter_active);
        if show_prompt {
            let area = next.next().unwrap_or_default();
            self.filter.render(frame, area, filter_active);
        }
        if self.show_log {
            self.log_area = next.next().unwrap_or_default();
            self.log.render(frame, self.log_area, false);
        }
        let status_area = next.next().unwrap_or_default();
        self.status.render(frame, status_area, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn synthetic_app() -> App {
        let config = TreeConfig {
            item_height_px: 1,
            indent_unit_px: 2,
            viewport_height_px: 10,
            ..TreeConfig::default()
        };
        let (log, _handle) = DebugLogComponent::new(100);
        App::new(TreeSource::Synthetic { nodes: 40, fanout: 3 }, config, log).unwrap()
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut app = synthetic_app();
        assert_eq!(app.handle_event(&key(KeyCode::Down)), ControlFlow::Continue);
        assert_eq!(app.handle_event(&key(KeyCode::Char('q'))), ControlFlow::Quit);
    }

    #[test]
    fn typing_in_prompt_filters_live() {
        let mut app = synthetic_app();
        app.handle_event(&key(KeyCode::Char('/')));
        for c in "node-2".chars() {
            app.handle_event(&key(KeyCode::Char(c)));
        }
        // q goes to the prompt while it is open.
        assert_eq!(app.handle_event(&key(KeyCode::Char('q'))), ControlFlow::Continue);
        assert_eq!(app.tree().filter_text(), "node-2q");
        assert_eq!(app.tree().display_len(), 0);
        app.handle_event(&key(KeyCode::Backspace));
        assert_eq!(app.tree().display_len(), 2);
        assert!(app.status().left().contains("filter: node-2"));
        app.handle_event(&key(KeyCode::Esc));
        assert_eq!(app.tree().display_len(), 4);
    }

    #[test]
    fn draws_tree_prompt_log_and_status() {
        let mut app = synthetic_app();
        app.handle_event(&key(KeyCode::F(2)));
        assert!(app.show_log());
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let status: String = (0..40).map(|x| buffer[(x, 19)].symbol().to_string()).collect();
        assert!(status.starts_with(" 4 of 40 rows"));
    }
}
