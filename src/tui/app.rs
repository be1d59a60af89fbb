//! UI state for the TUI.
//!
//! Holds everything the terminal needs that is not query state: focus,
//! editor contents, scroll offsets and overlay visibility. Query state lives
//! in [`crate::app::QueryController`].

use super::widgets::spinner::Spinner;
use super::Event;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Results,
    Sidebar,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Editor => Self::Results,
            Self::Results => Self::Sidebar,
            Self::Sidebar => Self::Editor,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Execute the editor contents.
    Submit(String),
    /// Reload the table catalog.
    RefreshTables,
    Quit,
}

/// Multi-line query editor. The cursor is a byte offset on a char boundary.
#[derive(Debug, Default)]
pub struct EditorState {
    pub text: String,
    pub cursor: usize,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Inserts a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Moves to the start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.line_start();
    }

    /// Moves to the end of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |offset| self.cursor + offset);
    }

    /// Moves to the same column on the previous line, clamped to its length.
    pub fn move_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            return;
        }
        let column = self.text[start..self.cursor].chars().count();
        let prev_start = self.text[..start - 1].rfind('\n').map_or(0, |i| i + 1);
        self.cursor = Self::offset_at_column(&self.text, prev_start, column);
    }

    /// Moves to the same column on the next line, clamped to its length.
    pub fn move_down(&mut self) {
        let Some(offset) = self.text[self.cursor..].find('\n') else {
            return;
        };
        let column = self.text[self.line_start()..self.cursor].chars().count();
        let next_start = self.cursor + offset + 1;
        self.cursor = Self::offset_at_column(&self.text, next_start, column);
    }

    /// Returns the cursor as (line, column) in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let column = before[self.line_start()..].chars().count();
        (line, column)
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn offset_at_column(text: &str, line_start: usize, column: usize) -> usize {
        let line = &text[line_start..];
        let line = line.split('\n').next().unwrap_or("");
        line.char_indices()
            .nth(column)
            .map_or(line_start + line.len(), |(i, _)| line_start + i)
    }
}

/// Main UI state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    pub focus: Focus,
    pub editor: EditorState,
    /// First visible result row.
    pub results_scroll: usize,
    /// First visible sidebar line.
    pub sidebar_scroll: usize,
    /// Diagnostics overlay visibility.
    pub show_diagnostics: bool,
    pub diagnostics_scroll: usize,
    /// Query service endpoint for the header.
    pub server_info: String,
    /// Active while a query is executing.
    pub spinner: Option<Spinner>,
}

impl App {
    pub fn new(server_info: impl Into<String>) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            editor: EditorState::new(),
            results_scroll: 0,
            sidebar_scroll: 0,
            show_diagnostics: false,
            diagnostics_scroll: 0,
            server_info: server_info.into(),
            spinner: None,
        }
    }

    pub fn start_spinner(&mut self) {
        self.spinner = Some(Spinner::executing());
    }

    /// Stops the spinner and resets result scrolling for the new result.
    pub fn finish_execution(&mut self) {
        self.spinner = None;
        self.results_scroll = 0;
        self.diagnostics_scroll = 0;
    }

    /// Handles an event and returns what the event loop should do.
    pub fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(_, _) | Event::Tick => Action::None,
        }
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.running = false;
                return Action::Quit;
            }
            KeyCode::F(5) => return self.submit(),
            KeyCode::Char('r') if ctrl => return self.submit(),
            KeyCode::Enter if ctrl => return self.submit(),
            KeyCode::F(6) => return Action::RefreshTables,
            KeyCode::F(2) => {
                self.show_diagnostics = !self.show_diagnostics;
                self.diagnostics_scroll = 0;
                return Action::None;
            }
            KeyCode::Esc if self.show_diagnostics => {
                self.show_diagnostics = false;
                return Action::None;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::None;
            }
            _ => {}
        }

        if self.show_diagnostics {
            Self::scroll(&mut self.diagnostics_scroll, key.code);
            return Action::None;
        }

        match self.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::Results => Self::scroll(&mut self.results_scroll, key.code),
            Focus::Sidebar => Self::scroll(&mut self.sidebar_scroll, key.code),
        }
        Action::None
    }

    /// The editor text is submitted unchanged; it is kept for re-editing.
    fn submit(&self) -> Action {
        Action::Submit(self.editor.text.clone())
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.editor.insert(c)
            }
            KeyCode::Enter => self.editor.insert('\n'),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Up => self.editor.move_up(),
            KeyCode::Down => self.editor.move_down(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            _ => {}
        }
    }

    fn scroll(offset: &mut usize, code: KeyCode) {
        match code {
            KeyCode::Up => *offset = offset.saturating_sub(1),
            KeyCode::Down => *offset = offset.saturating_add(1),
            KeyCode::PageUp => *offset = offset.saturating_sub(10),
            KeyCode::PageDown => *offset = offset.saturating_add(10),
            KeyCode::Home => *offset = 0,
            _ => {}
        }
    }
}
