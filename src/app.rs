//! Query execution controller.
//!
//! Owns the single user-facing state value and drives the query service:
//! every execution runs the query first and then refreshes the table catalog,
//! strictly in that order, so the catalog reflects the statement's effect.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{Envelope, QueryOutcome, QueryRequest, QueryService, TableCatalog};
use crate::config::Locale;
use crate::diagnostics::Diagnostics;
use crate::results::ResultGrid;
use crate::schema::{build_catalog, TableView};

/// Payload of a successful execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySuccess {
    /// Rows of the first statement.
    pub grid: ResultGrid,
    /// `Executed: {time} ms`.
    pub message: String,
    /// I/O counters and plan of the first statement.
    pub diagnostics: Diagnostics,
    /// Statements in the batch; only the first is shown.
    pub statement_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_message: Option<String>,
}

/// The controller's state. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryState {
    #[default]
    Idle,
    Executing {
        query: String,
    },
    Succeeded(QuerySuccess),
    Failed {
        message: String,
    },
}

impl QueryState {
    /// Short label for status badges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Executing { .. } => "executing",
            Self::Succeeded(_) => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    /// Success or failure message, if the state carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Succeeded(success) => Some(&success.message),
            Self::Failed { message } => Some(message),
            Self::Idle | Self::Executing { .. } => None,
        }
    }
}

/// Results of the two ordered calls made for one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub query: Envelope<QueryOutcome>,
    pub tables: Envelope<TableCatalog>,
}

/// Runs the query, then refreshes the catalog.
///
/// The catalog request is only sent after the query response has arrived,
/// and it is sent whatever the query outcome was.
pub async fn fetch(service: Arc<dyn QueryService>, request: QueryRequest) -> FetchOutcome {
    let query = service.execute(&request).await;
    let tables = service.list_tables().await;
    FetchOutcome { query, tables }
}

/// Marks which execution a catalog refresh was issued under.
///
/// Every [`QueryController::begin`] starts a new generation; refreshes
/// carrying an older ticket are discarded on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

fn format_millis(time_ms: Option<f64>) -> String {
    time_ms.map_or_else(|| "?".to_string(), |ms| ms.to_string())
}

/// Drives query execution and holds the resulting state.
pub struct QueryController {
    service: Arc<dyn QueryService>,
    locale: Locale,
    state: QueryState,
    catalog: TableCatalog,
    tables: Vec<TableView>,
    generation: u64,
}

impl QueryController {
    pub fn new(service: Arc<dyn QueryService>, locale: Locale) -> Self {
        Self {
            service,
            locale,
            state: QueryState::Idle,
            catalog: TableCatalog::new(),
            tables: Vec::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Most recently adopted catalog.
    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    /// Sidebar view of the adopted catalog.
    pub fn tables(&self) -> &[TableView] {
        &self.tables
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.state, QueryState::Executing { .. })
    }

    /// Returns a handle to the service for spawned fetches.
    pub fn service(&self) -> Arc<dyn QueryService> {
        Arc::clone(&self.service)
    }

    /// Ticket to send along with a standalone catalog refresh.
    pub fn refresh_ticket(&self) -> RefreshTicket {
        RefreshTicket(self.generation)
    }

    /// Initial catalog load, run once before any query.
    pub async fn mount(&mut self) {
        self.refresh_tables().await;
    }

    /// Reloads the catalog outside of an execution.
    ///
    /// Does nothing while a query is executing.
    pub async fn refresh_tables(&mut self) {
        if self.is_executing() {
            return;
        }
        let ticket = self.refresh_ticket();
        let tables = self.service.list_tables().await;
        self.apply_refresh(ticket, tables);
    }

    /// Adopts a standalone catalog refresh; failure moves to `Failed`.
    ///
    /// Refreshes issued before the latest submission are dropped, whether
    /// they land during that execution or after it completed.
    pub fn apply_refresh(&mut self, ticket: RefreshTicket, tables: Envelope<TableCatalog>) {
        if self.is_executing() || ticket.0 != self.generation {
            debug!("Dropping stale catalog refresh");
            return;
        }
        match tables {
            Ok(catalog) => {
                debug!("Catalog refreshed: {} tables", catalog.len());
                self.adopt_catalog(catalog);
            }
            Err(e) => {
                warn!("Catalog refresh failed: {}", e);
                self.state = QueryState::Failed {
                    message: self.locale.generic_failure().to_string(),
                };
            }
        }
    }

    /// Moves to `Executing` and returns the request to send.
    ///
    /// Returns `None` when an execution is already in flight; the query is
    /// otherwise submitted as typed, whitespace included.
    pub fn begin(&mut self, query: &str) -> Option<QueryRequest> {
        if self.is_executing() {
            debug!("Ignoring submission while executing");
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = QueryState::Executing {
            query: query.to_string(),
        };
        Some(QueryRequest::new(query))
    }

    /// Applies the outcome of [`fetch`] and leaves `Executing`.
    pub fn complete(&mut self, outcome: FetchOutcome) {
        let (outcome, catalog) = match (outcome.query, outcome.tables) {
            (Ok(outcome), Ok(catalog)) => (outcome, catalog),
            (query, tables) => {
                if let Err(e) = query {
                    warn!("Query transport failed: {}", e);
                }
                if let Err(e) = tables {
                    warn!("Catalog transport failed: {}", e);
                }
                self.state = QueryState::Failed {
                    message: self.locale.generic_failure().to_string(),
                };
                return;
            }
        };

        if outcome.ok {
            self.state = QueryState::Succeeded(Self::success(&outcome));
            self.adopt_catalog(catalog);
            info!("Query succeeded");
        } else {
            let message = Self::engine_failure_message(&outcome);
            info!("Query failed in engine");
            self.state = QueryState::Failed { message };
            self.adopt_catalog(TableCatalog::new());
        }
    }

    /// Runs one full execution: begin, fetch in order, complete.
    pub async fn execute(&mut self, query: &str) {
        let Some(request) = self.begin(query) else {
            return;
        };
        let outcome = fetch(self.service(), request).await;
        self.complete(outcome);
    }

    fn adopt_catalog(&mut self, catalog: TableCatalog) {
        self.tables = build_catalog(&catalog);
        self.catalog = catalog;
    }

    fn success(outcome: &QueryOutcome) -> QuerySuccess {
        let first = outcome.first();
        let time_ms = first
            .and_then(|result| result.meta.time_ms)
            .or(outcome.total_time_ms());

        QuerySuccess {
            grid: first
                .map(|result| ResultGrid::from_rows(&result.data))
                .unwrap_or_default(),
            message: format!("Executed: {} ms", format_millis(time_ms)),
            diagnostics: first
                .map(|result| Diagnostics::new(result.meta.io.as_ref(), result.plan.as_ref()))
                .unwrap_or_default(),
            statement_count: outcome.results.len(),
            action: first.and_then(|result| result.action.clone()),
            affected: first.and_then(|result| result.count),
            engine_message: first.and_then(|result| result.message.clone()),
        }
    }

    fn engine_failure_message(outcome: &QueryOutcome) -> String {
        let error = outcome
            .first()
            .and_then(|result| result.error.as_ref())
            .map(|error| error.message.as_str())
            .unwrap_or("unknown engine error");

        format!(
            "Executed: {} ms\nError: {}",
            format_millis(outcome.total_time_ms()),
            error
        )
    }
}
