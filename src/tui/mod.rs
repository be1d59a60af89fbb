//! Terminal User Interface for QueryDeck.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
mod ui;
pub mod widgets;

pub use app::{Action, App};
pub use events::{Event, EventHandler};

use crate::api::{Envelope, TableCatalog};
use crate::app::{fetch, FetchOutcome, QueryController, RefreshTicket};
use crate::error::{QueryDeckError, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum AsyncMessage {
    /// Query and catalog calls of one execution finished.
    Executed(FetchOutcome),
    /// A standalone catalog refresh finished.
    TablesRefreshed(RefreshTicket, Envelope<TableCatalog>),
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| QueryDeckError::terminal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            QueryDeckError::terminal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| QueryDeckError::terminal(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| QueryDeckError::terminal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).map_err(|e| {
            QueryDeckError::terminal(format!("Failed to leave alternate screen: {e}"))
        })?;

        self.terminal
            .show_cursor()
            .map_err(|e| QueryDeckError::terminal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the main event loop until the user quits.
    pub async fn run(&mut self, controller: &mut QueryController) -> Result<()> {
        // Set up panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let mut app = App::new(controller.service().describe());
        let (tx, mut rx) = mpsc::channel::<AsyncMessage>(32);
        let (input_tx, mut input_rx) = mpsc::channel::<Result<Event>>(64);

        // Terminal input is read on a blocking thread; it stops once the
        // receiving side is gone.
        let handler = self.event_handler;
        tokio::task::spawn_blocking(move || loop {
            let event = handler.next();
            let failed = event.is_err();
            if input_tx.blocking_send(event).is_err() || failed {
                break;
            }
        });

        // Initial catalog load.
        Self::spawn_refresh(controller, &tx);

        let result = self
            .run_event_loop(&mut app, controller, &tx, &mut rx, &mut input_rx)
            .await;

        // Restore panic hook
        let _ = panic::take_hook();

        result
    }

    /// The main event loop, separated for cleaner error handling.
    async fn run_event_loop(
        &mut self,
        app: &mut App,
        controller: &mut QueryController,
        tx: &mpsc::Sender<AsyncMessage>,
        rx: &mut mpsc::Receiver<AsyncMessage>,
        input_rx: &mut mpsc::Receiver<Result<Event>>,
    ) -> Result<()> {
        loop {
            self.terminal
                .draw(|frame| ui::render(frame, app, controller))
                .map_err(|e| QueryDeckError::terminal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            tokio::select! {
                input = input_rx.recv() => {
                    let Some(event) = input else {
                        return Err(QueryDeckError::terminal("Terminal input closed"));
                    };
                    let action = app.handle_event(event?);
                    Self::dispatch(action, app, controller, tx);
                }

                Some(msg) = rx.recv() => {
                    Self::handle_async_message(msg, app, controller);
                }
            }
        }

        Ok(())
    }

    /// Carries out the action requested by a key press.
    fn dispatch(
        action: Action,
        app: &mut App,
        controller: &mut QueryController,
        tx: &mpsc::Sender<AsyncMessage>,
    ) {
        match action {
            Action::None => {}
            Action::Quit => info!("Quit requested"),
            Action::RefreshTables => Self::spawn_refresh(controller, tx),
            Action::Submit(query) => {
                let Some(request) = controller.begin(&query) else {
                    return;
                };
                app.start_spinner();

                let service = controller.service();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = fetch(service, request).await;
                    if tx.send(AsyncMessage::Executed(outcome)).await.is_err() {
                        debug!("Execution finished after the UI closed");
                    }
                });
            }
        }
    }

    /// Starts a catalog refresh in the background unless a query is executing.
    fn spawn_refresh(controller: &QueryController, tx: &mpsc::Sender<AsyncMessage>) {
        if controller.is_executing() {
            debug!("Skipping catalog refresh while executing");
            return;
        }

        let ticket = controller.refresh_ticket();
        let service = controller.service();
        let tx = tx.clone();
        tokio::spawn(async move {
            let tables = service.list_tables().await;
            let msg = AsyncMessage::TablesRefreshed(ticket, tables);
            if tx.send(msg).await.is_err() {
                debug!("Catalog refresh finished after the UI closed");
            }
        });
    }

    /// Handles an async message from a background task.
    fn handle_async_message(msg: AsyncMessage, app: &mut App, controller: &mut QueryController) {
        match msg {
            AsyncMessage::Executed(outcome) => {
                controller.complete(outcome);
                app.finish_execution();
            }
            AsyncMessage::TablesRefreshed(ticket, tables) => {
                controller.apply_refresh(ticket, tables)
            }
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.restore_terminal() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Runs the interactive TUI against the controller's service.
pub async fn run_async(mut controller: QueryController) -> Result<()> {
    info!("Starting TUI against {}", controller.service().describe());
    let mut tui = Tui::new()?;
    tui.run(&mut controller).await
}
