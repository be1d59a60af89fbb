//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{
    diagnostics::DiagnosticsModal, editor::Editor, header::Header, sidebar::Sidebar,
    status::StatusBanner, table::ResultsPanel,
};
use crate::app::{QueryController, QueryState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Height of the query editor, including borders.
const EDITOR_HEIGHT: u16 = 8;

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App, controller: &QueryController) {
    let area = frame.area();

    // Main layout: header, content
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Content (sidebar + workspace)
        ])
        .split(area);

    let header_area = main_layout[0];
    let content_area = main_layout[1];

    // Content layout: sidebar (30%) and workspace (70%)
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(content_area);

    let sidebar_area = content_layout[0];
    let workspace_area = content_layout[1];

    let state = controller.state();
    let workspace = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(EDITOR_HEIGHT),
            Constraint::Length(StatusBanner::height(state)),
            Constraint::Min(3),
        ])
        .split(workspace_area);

    render_header(frame, header_area, app, state);
    render_sidebar(frame, sidebar_area, app, controller);
    render_editor(frame, workspace[0], app, controller.is_executing());
    frame.render_widget(StatusBanner::new(state, app.spinner.as_ref()), workspace[1]);
    render_results(frame, workspace[2], app, state);

    if app.show_diagnostics {
        let diagnostics = match state {
            QueryState::Succeeded(success) => Some(&success.diagnostics),
            _ => None,
        };
        frame.render_widget(
            DiagnosticsModal::new(diagnostics, app.diagnostics_scroll),
            area,
        );
    }
}

/// Renders the header bar.
fn render_header(frame: &mut Frame, area: Rect, app: &App, state: &QueryState) {
    let widget = Header::new(&app.server_info, state, app.spinner.as_ref());
    frame.render_widget(widget, area);
}

/// Renders the table catalog.
fn render_sidebar(frame: &mut Frame, area: Rect, app: &App, controller: &QueryController) {
    let focused = app.focus == Focus::Sidebar;
    let widget = Sidebar::new(controller.tables(), app.sidebar_scroll, focused);
    frame.render_widget(widget, area);
}

/// Renders the editor and places the terminal cursor in it when focused.
fn render_editor(frame: &mut Frame, area: Rect, app: &App, executing: bool) {
    let focused = app.focus == Focus::Editor;
    frame.render_widget(Editor::new(&app.editor, focused, executing), area);

    if focused && !app.show_diagnostics {
        frame.set_cursor_position(Editor::cursor_position(&app.editor, area));
    }
}

/// Renders the result table of the last successful execution.
fn render_results(frame: &mut Frame, area: Rect, app: &App, state: &QueryState) {
    let focused = app.focus == Focus::Results;
    let success = match state {
        QueryState::Succeeded(success) => Some(success),
        _ => None,
    };
    frame.render_widget(
        ResultsPanel::new(success, app.results_scroll, focused),
        area,
    );
}
