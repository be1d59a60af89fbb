//! Status banner below the editor.

use super::spinner::Spinner;
use crate::app::{QueryState, QuerySuccess};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Banner with the current success or failure message.
pub struct StatusBanner<'a> {
    state: &'a QueryState,
    spinner: Option<&'a Spinner>,
}

impl<'a> StatusBanner<'a> {
    pub fn new(state: &'a QueryState, spinner: Option<&'a Spinner>) -> Self {
        Self { state, spinner }
    }

    /// Height needed for the banner, including borders.
    pub fn height(state: &QueryState) -> u16 {
        let lines = state.message().map_or(1, |message| message.lines().count().max(1));
        lines as u16 + 2
    }

    fn lines(&self) -> (Color, Vec<Line<'a>>) {
        match self.state {
            QueryState::Idle => (
                Color::DarkGray,
                vec![Line::from(Span::styled(
                    "Ready. Tab switches panels, F2 shows diagnostics, F6 reloads tables.",
                    Style::default().fg(Color::DarkGray),
                ))],
            ),
            QueryState::Executing { .. } => {
                let text = self
                    .spinner
                    .map_or_else(|| "Executing...".to_string(), Spinner::display);
                (
                    Color::Yellow,
                    vec![Line::from(Span::styled(
                        text,
                        Style::default().fg(Color::Yellow),
                    ))],
                )
            }
            QueryState::Succeeded(success) => {
                let mut spans = vec![Span::styled(
                    format!("✓ {}", success.message),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )];
                if let Some(summary) = Self::statement_summary(success) {
                    spans.push(Span::styled(
                        format!("  {summary}"),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                if let Some(message) = &success.engine_message {
                    spans.push(Span::styled(
                        format!("  {}", message),
                        Style::default().fg(Color::Gray),
                    ));
                }
                (Color::Green, vec![Line::from(spans)])
            }
            QueryState::Failed { message } => {
                let style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
                let lines = message
                    .lines()
                    .enumerate()
                    .map(|(i, line)| {
                        let prefix = if i == 0 { "✗ " } else { "  " };
                        Line::from(Span::styled(format!("{prefix}{}", line.trim()), style))
                    })
                    .collect();
                (Color::Red, lines)
            }
        }
    }
}

impl StatusBanner<'_> {
    /// `select · 2 rows`, or whichever half is known.
    fn statement_summary(success: &QuerySuccess) -> Option<String> {
        let count = success.affected.map(|n| match n {
            1 => "1 row".to_string(),
            n => format!("{n} rows"),
        });
        match (&success.action, count) {
            (Some(action), Some(count)) => Some(format!("{action} · {count}")),
            (Some(action), None) => Some(action.clone()),
            (None, count) => count,
        }
    }
}

impl Widget for StatusBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (color, lines) = self.lines();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
