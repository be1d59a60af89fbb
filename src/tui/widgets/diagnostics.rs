//! Diagnostics modal widget.
//!
//! Shows the I/O counters and the execution plan of the first statement in a
//! modal overlay.

use crate::diagnostics::{Diagnostics, IoReport, PlanReport};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Modal widget for the diagnostics of the last successful execution.
pub struct DiagnosticsModal<'a> {
    diagnostics: Option<&'a Diagnostics>,
    scroll: usize,
}

impl<'a> DiagnosticsModal<'a> {
    pub fn new(diagnostics: Option<&'a Diagnostics>, scroll: usize) -> Self {
        Self {
            diagnostics,
            scroll,
        }
    }

    /// Calculates the modal area centered in the given area.
    fn modal_area(area: Rect) -> Rect {
        let width = (area.width * 80 / 100).clamp(40, 100).min(area.width);
        let height = (area.height * 70 / 100).clamp(10, 30).min(area.height);

        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;

        Rect::new(x, y, width, height)
    }

    fn section(title: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn io_lines(io: &IoReport) -> Vec<Line<'static>> {
        let width = io
            .lines
            .iter()
            .map(|line| line.resource.chars().count())
            .chain(std::iter::once("Total".len()))
            .max()
            .unwrap_or(0);

        let header_style = Style::default().fg(Color::Cyan);
        let mut lines = vec![Line::from(Span::styled(
            format!("  {:width$}  {:>8}  {:>8}", "Resource", "Reads", "Writes"),
            header_style,
        ))];
        lines.extend(io.lines.iter().map(|line| {
            Line::raw(format!(
                "  {:width$}  {:>8}  {:>8}",
                line.resource, line.reads, line.writes
            ))
        }));
        lines.push(Line::from(Span::styled(
            format!(
                "  {:width$}  {:>8}  {:>8}",
                "Total", io.total_reads, io.total_writes
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines
    }

    fn plan_lines(plan: &PlanReport) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = plan
            .fields
            .iter()
            .map(|(name, value)| {
                Line::from(vec![
                    Span::styled(format!("  {name}: "), Style::default().fg(Color::Cyan)),
                    Span::raw(value.clone()),
                ])
            })
            .collect();
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Raw plan",
            Style::default().fg(Color::DarkGray),
        )));
        lines.extend(
            plan.raw
                .lines()
                .map(|line| Line::raw(format!("  {line}"))),
        );
        lines
    }

    /// Builds the modal body before scrolling.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let Some(diagnostics) = self.diagnostics.filter(|d| !d.is_empty()) else {
            return vec![Line::from(Span::styled(
                "No diagnostics for the last execution.",
                Style::default().fg(Color::DarkGray),
            ))];
        };

        let mut lines = Vec::new();
        if let Some(io) = &diagnostics.io {
            lines.push(Self::section("I/O"));
            lines.extend(Self::io_lines(io));
        }
        if let Some(plan) = &diagnostics.plan {
            if !lines.is_empty() {
                lines.push(Line::raw(""));
            }
            lines.push(Self::section("Plan"));
            lines.extend(Self::plan_lines(plan));
        }
        lines
    }
}

impl Widget for DiagnosticsModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal_area = Self::modal_area(area);

        Clear.render(modal_area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Diagnostics [Esc to close] ")
            .title_alignment(Alignment::Center);

        let lines: Vec<Line> = self.lines().into_iter().skip(self.scroll).collect();
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(modal_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{IoStats, PlanInfo};
    use serde_json::json;

    fn diagnostics() -> Diagnostics {
        let io: IoStats = serde_json::from_value(json!({
            "heap": { "read_count": 3, "write_count": 1 },
            "index": { "readCount": 2 }
        }))
        .unwrap();
        let plan: PlanInfo = serde_json::from_value(json!({
            "action": "select",
            "table": "users",
            "columns": ["id", "name"],
            "where": null
        }))
        .unwrap();
        Diagnostics::new(Some(&io), Some(&plan))
    }

    fn render(modal: DiagnosticsModal) -> String {
        let area = Rect::new(0, 0, 100, 40);
        let mut buf = Buffer::empty(area);
        modal.render(area, &mut buf);
        buf.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_modal_area_calculation() {
        let area = Rect::new(0, 0, 100, 50);
        let modal = DiagnosticsModal::modal_area(area);

        assert!(modal.x > 0);
        assert!(modal.y > 0);
        assert!(modal.x + modal.width <= area.width);
        assert!(modal.y + modal.height <= area.height);
    }

    #[test]
    fn test_modal_area_small_terminal() {
        let area = Rect::new(0, 0, 30, 8);
        let modal = DiagnosticsModal::modal_area(area);
        assert!(modal.width <= 30);
        assert!(modal.height <= 8);
    }

    #[test]
    fn test_renders_io_totals_and_plan() {
        let diagnostics = diagnostics();
        let rendered = render(DiagnosticsModal::new(Some(&diagnostics), 0));

        assert!(rendered.contains("Diagnostics"));
        assert!(rendered.contains("heap"));
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("columns: id, name"));
        assert!(rendered.contains("where: null"));
        assert!(rendered.contains("Raw plan"));
    }

    #[test]
    fn test_empty_diagnostics() {
        let rendered = render(DiagnosticsModal::new(None, 0));
        assert!(rendered.contains("No diagnostics for the last execution."));

        let empty = Diagnostics::default();
        let lines = DiagnosticsModal::new(Some(&empty), 0).lines();
        assert_eq!(lines.len(), 1);
    }
}
