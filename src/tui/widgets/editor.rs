//! Query editor widget for the TUI.
//!
//! Multi-line text area that scrolls to keep the cursor visible.

use crate::tui::app::EditorState;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Placeholder shown while the editor is empty.
const PLACEHOLDER: &str = "Enter your SQL statement...";

/// Calculates the scroll offset needed to keep `cursor` within `available` cells.
///
/// Used for both axes: columns within a line and lines within the area.
pub fn calculate_scroll_offset(cursor: usize, available: usize) -> usize {
    if available == 0 {
        cursor
    } else if cursor < available {
        0
    } else {
        cursor + 1 - available
    }
}

/// Editor widget.
pub struct Editor<'a> {
    state: &'a EditorState,
    focused: bool,
    executing: bool,
}

impl<'a> Editor<'a> {
    pub fn new(state: &'a EditorState, focused: bool, executing: bool) -> Self {
        Self {
            state,
            focused,
            executing,
        }
    }

    /// Returns the terminal position of the cursor for an editor drawn in `area`.
    pub fn cursor_position(state: &EditorState, area: Rect) -> Position {
        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;
        let (line, column) = state.cursor_position();
        let row = line - calculate_scroll_offset(line, inner_height);
        let col = column - calculate_scroll_offset(column, inner_width);
        Position::new(area.x + 1 + col as u16, area.y + 1 + row as u16)
    }
}

impl Widget for Editor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let title = if self.executing {
            " Query (executing...) "
        } else {
            " Query [F5/Ctrl+R run] "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        if self.state.is_empty() {
            let placeholder = Line::from(Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ));
            Paragraph::new(placeholder).block(block).render(area, buf);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;
        let (line, column) = self.state.cursor_position();
        let skip_lines = calculate_scroll_offset(line, inner_height);
        let skip_columns = calculate_scroll_offset(column, inner_width);

        let lines: Vec<Line> = self
            .state
            .text
            .split('\n')
            .skip(skip_lines)
            .map(|text| Line::raw(text.chars().skip(skip_columns).collect::<String>()))
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_within_area() {
        assert_eq!(calculate_scroll_offset(0, 20), 0);
        assert_eq!(calculate_scroll_offset(19, 20), 0);
    }

    #[test]
    fn test_scroll_offset_beyond_area() {
        assert_eq!(calculate_scroll_offset(20, 20), 1);
        assert_eq!(calculate_scroll_offset(50, 20), 31);
        assert_eq!(calculate_scroll_offset(5, 0), 5);
    }

    #[test]
    fn test_cursor_position_inside_border() {
        let mut state = EditorState::new();
        state.insert_str("SELECT\n1");
        let position = Editor::cursor_position(&state, Rect::new(10, 5, 40, 6));
        assert_eq!(position, Position::new(12, 7));
    }

    #[test]
    fn test_placeholder_when_empty() {
        let state = EditorState::new();
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        Editor::new(&state, true, false).render(area, &mut buf);
        let rendered: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains(PLACEHOLDER));
    }
}
