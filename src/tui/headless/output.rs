//! Output formatting for headless mode.

use super::HeadlessResult;
use crate::cli::OutputFormat;
use ratatui::buffer::Buffer;

/// Renders a ratatui buffer to a string.
pub struct ScreenRenderer;

impl ScreenRenderer {
    /// Renders a buffer to plain text, trimming trailing spaces and blank
    /// trailing lines.
    pub fn render(buffer: &Buffer) -> String {
        let area = buffer.area;
        if area.height == 0 {
            return String::new();
        }

        let mut lines: Vec<String> = (area.top()..area.bottom())
            .map(|y| {
                let line: String = (area.left()..area.right())
                    .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol()))
                    .collect();
                line.trim_end_matches(' ').to_string()
            })
            .collect();

        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        format!("{}\n", lines.join("\n"))
    }
}

/// Formats headless execution results.
pub struct HeadlessOutput {
    format: OutputFormat,
}

impl HeadlessOutput {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result according to the configured format.
    pub fn format(&self, result: &HeadlessResult) -> String {
        match self.format {
            OutputFormat::Text => self.format_text(result),
            OutputFormat::Json => self.format_json(result),
        }
    }

    /// Final state and message, then the rendered screen.
    fn format_text(&self, result: &HeadlessResult) -> String {
        let mut text = format!("State: {}\n", result.state.label());
        if let Some(message) = result.state.message() {
            text.push_str(message);
            text.push('\n');
        }
        text.push_str(&format!(
            "Queries: {} executed in {}ms\n\n",
            result.queries.len(),
            result.duration.as_millis()
        ));
        text.push_str(&result.screen);
        text
    }

    fn format_json(&self, result: &HeadlessResult) -> String {
        serde_json::to_string_pretty(result)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e))
    }
}
