use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Component;
use super::scroll_view::{ScrollState, render_scrollbar};

pub const DEFAULT_MAX_LINES: usize = 2000;
static GLOBAL_LOG: OnceLock<DebugLogHandle> = OnceLock::new();

/// Register the process-wide sink. Only the first registration wins.
pub fn set_global_debug_log(handle: DebugLogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_debug_log() -> Option<DebugLogHandle> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct DebugLogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl DebugLogBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

/// Shared ring of log lines. Cloning shares the buffer.
#[derive(Clone, Debug)]
pub struct DebugLogHandle {
    inner: Arc<Mutex<DebugLogBuffer>>,
}

impl DebugLogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DebugLogBuffer::new(max_lines))),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|b| b.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn writer(&self) -> DebugLogWriter {
        DebugLogWriter::new(self.clone())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for DebugLogHandle {
    type Writer = DebugLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

/// `io::Write` adapter that splits incoming bytes into lines.
#[derive(Debug)]
pub struct DebugLogWriter {
    handle: DebugLogHandle,
    pending: Vec<u8>,
}

impl DebugLogWriter {
    pub fn new(handle: DebugLogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn push_complete_lines(&mut self) {
        let Some(pos) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return;
        };
        let drained: Vec<u8> = self.pending.drain(..=pos).collect();
        for line in String::from_utf8_lossy(&drained).split('\n') {
            if !line.is_empty() {
                self.handle.push(line.to_string());
            }
        }
    }
}

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.push_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.push_complete_lines();
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).to_string();
            self.pending.clear();
            self.handle.push(rest);
        }
        Ok(())
    }
}

impl Drop for DebugLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Scrollable pane over a [`DebugLogHandle`]. Follows the tail until the
/// user scrolls up.
#[derive(Debug)]
pub struct DebugLogComponent {
    handle: DebugLogHandle,
    scroll: ScrollState,
    follow_tail: bool,
    last_total: usize,
    last_view: usize,
}

impl DebugLogComponent {
    pub fn new(max_lines: usize) -> (Self, DebugLogHandle) {
        let handle = DebugLogHandle::new(max_lines);
        (
            Self {
                handle: handle.clone(),
                scroll: ScrollState::default(),
                follow_tail: true,
                last_total: 0,
                last_view: 0,
            },
            handle,
        )
    }

    pub fn new_default() -> (Self, DebugLogHandle) {
        Self::new(DEFAULT_MAX_LINES)
    }

    pub fn handle(&self) -> &DebugLogHandle {
        &self.handle
    }

    fn is_at_bottom(&self) -> bool {
        self.last_view == 0 || self.scroll.offset >= self.last_total.saturating_sub(self.last_view)
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll.bump(delta);
        self.scroll.apply(self.last_total, self.last_view);
        self.follow_tail = self.is_at_bottom();
    }
}

impl Component for DebugLogComponent {
    fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let mut block = Block::default().borders(Borders::TOP).title("log");
        if focused {
            block = block.border_style(Style::default().fg(crate::theme::border_focused()));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.handle.snapshot();
        self.last_total = lines.len();
        self.last_view = inner.height as usize;
        if self.follow_tail {
            self.scroll.offset = self.last_total.saturating_sub(self.last_view);
        }
        self.scroll.apply(self.last_total, self.last_view);

        let text = Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>());
        let top = self.scroll.offset.min(u16::MAX as usize) as u16;
        let paragraph = Paragraph::new(text)
            .scroll((top, 0))
            .style(Style::default().fg(crate::theme::debug_log_fg()));
        frame.render_widget(paragraph, inner);
        render_scrollbar(frame, inner, self.last_total, self.last_view, self.scroll.offset);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let page = self.last_view.max(1) as isize;
        match event {
            Event::Key(key) => match key.code {
                KeyCode::PageUp => self.scroll_by(-page),
                KeyCode::PageDown => self.scroll_by(page),
                _ => return false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_by(-3),
                MouseEventKind::ScrollDown => self.scroll_by(3),
                _ => return false,
            },
            _ => return false,
        }
        true
    }
}
