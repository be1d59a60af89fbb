//! Result table widget for the TUI.
//!
//! Renders the first statement's rows with column headers, auto-sized
//! columns and styled NULL values, or a placeholder when there are no rows.

use crate::app::QuerySuccess;
use crate::results::{Cell, ResultGrid};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Widget for rendering a result grid as a table.
pub struct ResultTable<'a> {
    grid: &'a ResultGrid,
}

impl<'a> ResultTable<'a> {
    pub fn new(grid: &'a ResultGrid) -> Self {
        Self { grid }
    }

    /// Calculates the optimal width for each column.
    fn calculate_column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .grid
            .headers()
            .iter()
            .map(|header| header.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in self.grid.rows() {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.text.chars().count());
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates a string to fit within the given width, adding ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let head: String = s.chars().take(max_width - 3).collect();
            format!("{head}...")
        }
    }

    /// Renders the table to lines: borders, header, then every data row.
    pub fn render_to_lines(&self, available_width: usize) -> Vec<Line<'a>> {
        let widths = self.calculate_column_widths();

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
        let scale_factor = if total_width > available_width && available_width > 0 {
            available_width as f64 / total_width as f64
        } else {
            1.0
        };

        let adjusted_widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        let mut lines = vec![
            self.render_border(&adjusted_widths, '┌', '┬', '┐'),
            self.render_header_row(&adjusted_widths),
            self.render_border(&adjusted_widths, '├', '┼', '┤'),
        ];
        lines.extend(
            self.grid
                .rows()
                .iter()
                .map(|row| self.render_data_row(row, &adjusted_widths)),
        );
        lines.push(self.render_border(&adjusted_widths, '└', '┴', '┘'));
        lines
    }

    fn render_border(&self, widths: &[usize], left: char, mid: char, right: char) -> Line<'a> {
        let mut border = String::new();
        border.push(left);

        for (i, &width) in widths.iter().enumerate() {
            border.push_str(&"─".repeat(width + 2));
            if i < widths.len() - 1 {
                border.push(mid);
            }
        }

        border.push(right);

        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    fn render_header_row(&self, widths: &[usize]) -> Line<'a> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (header, &width) in self.grid.headers().iter().zip(widths) {
            let name = Self::truncate(header, width);
            spans.push(Span::styled(
                format!(" {:width$} ", name, width = width),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    fn render_data_row(&self, row: &[Cell], widths: &[usize]) -> Line<'a> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (cell, &width) in row.iter().zip(widths) {
            let truncated = Self::truncate(&cell.text, width);
            let style = if cell.is_null {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };

            spans.push(Span::styled(
                format!(" {:width$} ", truncated, width = width),
                style,
            ));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }
}

/// Results pane: title with row count, the table, or the empty-state placeholder.
pub struct ResultsPanel<'a> {
    success: Option<&'a QuerySuccess>,
    scroll: usize,
    focused: bool,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(success: Option<&'a QuerySuccess>, scroll: usize, focused: bool) -> Self {
        Self {
            success,
            scroll,
            focused,
        }
    }

    fn title(&self) -> String {
        match self.success {
            Some(success) if !success.grid.is_empty() => {
                let mut title = format!(" Results ({} rows)", success.grid.row_count());
                if success.statement_count > 1 {
                    title.push_str(&format!(
                        " - showing 1 of {} statements",
                        success.statement_count
                    ));
                }
                title.push(' ');
                title
            }
            _ => " Results ".to_string(),
        }
    }
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(self.title());

        let grid = self.success.map(|success| &success.grid);
        let Some(grid) = grid.filter(|grid| !grid.is_empty()) else {
            let inner_height = area.height.saturating_sub(2);
            let mut lines = vec![Line::raw(""); (inner_height / 2).saturating_sub(1) as usize];
            lines.push(Line::from(Span::styled(
                "No data",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                "Execute a query to see the results here",
                Style::default().fg(Color::DarkGray),
            )));
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        };

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = ResultTable::new(grid).render_to_lines(inner.width as usize);
        // Keep the top border and header pinned; scroll the data rows.
        let (head, body) = lines.split_at(3.min(lines.len()));
        let visible = head.iter().chain(body.iter().skip(self.scroll));

        for (i, line) in visible.enumerate() {
            if i >= inner.height as usize {
                break;
            }
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}
