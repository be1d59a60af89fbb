//! Sidebar widget for the TUI.
//!
//! Lists the tables of the adopted catalog, each followed by its columns with
//! type, primary-key marker and index badge.

use crate::schema::TableView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Sidebar widget for the table catalog.
pub struct Sidebar<'a> {
    tables: &'a [TableView],
    scroll: usize,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(tables: &'a [TableView], scroll: usize, focused: bool) -> Self {
        Self {
            tables,
            scroll,
            focused,
        }
    }

    /// Builds all sidebar lines before scrolling.
    pub fn lines(&self) -> Vec<Line<'a>> {
        if self.tables.is_empty() {
            return vec![Line::from(Span::styled(
                "No tables",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let mut lines = Vec::new();
        for table in self.tables {
            lines.push(Line::from(vec![
                Span::styled("▤ ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    table.name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));

            for column in &table.columns {
                let mut spans = vec![
                    Span::raw("  "),
                    Span::styled(
                        if column.primary_key { "PK" } else { "  " },
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(" "),
                    Span::raw(column.name.as_str()),
                    Span::styled(
                        format!(" {}", column.type_label),
                        Style::default().fg(Color::DarkGray),
                    ),
                ];
                if let Some(kind) = column.index {
                    spans.push(Span::styled(
                        format!(" [{}]", kind.badge()),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                lines.push(Line::from(spans));
            }
        }
        lines
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" Tables ({}) ", self.tables.len()));

        let lines: Vec<Line> = self.lines().into_iter().skip(self.scroll).collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
