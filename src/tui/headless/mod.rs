//! Headless mode for scripted runs and automation.
//!
//! Drives the controller without a terminal: the catalog is loaded, each
//! query runs to completion in order, and the final screen is rendered
//! through ratatui's `TestBackend` with the same code the TUI uses.

mod output;

pub use output::{HeadlessOutput, ScreenRenderer};

use crate::app::{QueryController, QueryState};
use crate::cli::{Cli, OutputFormat};
use crate::error::{QueryDeckError, Result};
use crate::tui::app::App;
use crate::tui::ui;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Screen width in columns.
    pub width: u16,
    /// Screen height in rows.
    pub height: u16,
    pub output_format: OutputFormat,
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size().map_err(QueryDeckError::config)?;
        let output_format = cli.parse_output_format().map_err(QueryDeckError::config)?;

        Ok(Self {
            width,
            height,
            output_format,
        })
    }
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 30,
            output_format: OutputFormat::Text,
        }
    }
}

/// Result of headless execution.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessResult {
    /// Query service the run was made against.
    pub server: String,
    /// Queries in execution order.
    pub queries: Vec<String>,
    /// Final controller state.
    #[serde(flatten)]
    pub state: QueryState,
    /// Names of the adopted catalog's tables.
    pub tables: Vec<String>,
    /// Final screen content as text.
    pub screen: String,
    /// Screen lines for JSON output.
    pub screen_lines: Vec<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl HeadlessResult {
    /// True unless the run ended in `Failed`.
    pub fn succeeded(&self) -> bool {
        !matches!(self.state, QueryState::Failed { .. })
    }
}

/// Runs the catalog load and then every query, in order.
pub async fn run(
    controller: &mut QueryController,
    queries: &[String],
    config: &HeadlessConfig,
) -> Result<HeadlessResult> {
    let start = Instant::now();
    let server = controller.service().describe();
    info!("Headless run against {} ({} queries)", server, queries.len());

    controller.mount().await;
    for query in queries {
        controller.execute(query).await;
        info!("{} -> {}", query.trim(), controller.state().label());
    }

    let mut app = App::new(server.clone());
    if let Some(last) = queries.last() {
        app.editor.insert_str(last);
    }
    let screen = render_screen(&app, controller, config.width, config.height)?;

    Ok(HeadlessResult {
        server,
        queries: queries.to_vec(),
        state: controller.state().clone(),
        tables: controller.catalog().names().map(String::from).collect(),
        screen_lines: screen.lines().map(String::from).collect(),
        screen,
        duration: start.elapsed(),
    })
}

/// Renders one frame of the UI into a string.
pub fn render_screen(
    app: &App,
    controller: &QueryController,
    width: u16,
    height: u16,
) -> Result<String> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| QueryDeckError::internal(format!("Failed to create terminal: {e}")))?;

    terminal
        .draw(|frame| ui::render(frame, app, controller))
        .map_err(|e| QueryDeckError::internal(format!("Failed to draw: {e}")))?;

    Ok(ScreenRenderer::render(terminal.backend().buffer()))
}
