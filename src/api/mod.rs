//! Client side of the query service.
//!
//! Provides a trait-based interface over the two remote operations (list
//! tables, execute a query) so the controller can run against HTTP or an
//! in-memory service interchangeably.

mod http;
mod mock;
mod types;

pub use http::HttpQueryService;
pub use mock::{MockCall, MockQueryService};
pub use types::{
    EngineFailure, ExecutionStats, IoCounter, IoEntry, IoStats, PlanInfo, QueryOutcome,
    QueryRequest, Row, StatementMeta, StatementResult, TableCatalog,
};

use crate::config::ServerConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure side of a transport envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection, DNS, timeout or payload decoding failure.
    #[error("{0}")]
    Fault(String),
}

impl TransportError {
    /// Creates a fault with the given description.
    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }
}

/// Uniform result of a transport call: data on success, a [`TransportError`] otherwise.
pub type Envelope<T> = std::result::Result<T, TransportError>;

/// The remote query service as seen by the client.
///
/// Implementations attempt every call exactly once and report failures
/// through the envelope; they never panic or retry.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Fetches schema and index metadata for every table.
    async fn list_tables(&self) -> Envelope<TableCatalog>;

    /// Submits a query for execution.
    async fn execute(&self, request: &QueryRequest) -> Envelope<QueryOutcome>;

    /// Short description of the endpoint for the header bar.
    fn describe(&self) -> String;
}

/// Creates the query service for the given server settings.
///
/// With `use_mock` an in-memory demo service is returned instead of an HTTP client.
pub fn connect(server: &ServerConfig, use_mock: bool) -> Result<Arc<dyn QueryService>> {
    if use_mock {
        return Ok(Arc::new(MockQueryService::demo()));
    }
    Ok(Arc::new(HttpQueryService::new(server)?))
}
