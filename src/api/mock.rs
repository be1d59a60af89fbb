//! Mock query service for testing.
//!
//! Provides an in-memory service with a small demo catalog for headless runs,
//! plus scripted responses and a call log for controller tests.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{
    EngineFailure, Envelope, ExecutionStats, IoStats, PlanInfo, QueryOutcome, QueryRequest,
    QueryService, Row, StatementMeta, StatementResult, TableCatalog,
};

/// A call recorded by [`MockQueryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Execute(String),
    ListTables,
}

/// A query service that answers from memory.
///
/// Scripted responses are consumed first, in order; once a queue is empty the
/// service falls back to its built-in behavior over the demo data.
#[derive(Debug, Default)]
pub struct MockQueryService {
    catalog: TableCatalog,
    rows: HashMap<String, Vec<Row>>,
    query_script: Mutex<VecDeque<Envelope<QueryOutcome>>>,
    tables_script: Mutex<VecDeque<Envelope<TableCatalog>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockQueryService {
    /// Creates a mock service with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock service serving the given catalog.
    pub fn with_catalog(catalog: TableCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Creates a mock service with two demo tables and a few rows.
    pub fn demo() -> Self {
        let catalog = TableCatalog::new()
            .with_table(
                "users",
                json!({
                    "relation": {
                        "id": { "type": "int", "key": "primary" },
                        "name": { "type": "varchar", "length": 32 },
                        "email": { "type": "varchar", "length": 64 }
                    },
                    "indexes": {
                        "primary": { "index": "bplus", "filename": "users-bplus-id.dat" },
                        "name": { "index": "hash", "filename": "users-hash-name.dat" }
                    }
                }),
            )
            .with_table(
                "places",
                json!({
                    "relation": {
                        "code": { "type": "int", "key": "primary" },
                        "location": { "type": "point" }
                    },
                    "indexes": {
                        "primary": { "index": "isam", "filename": "places-isam-code.dat" },
                        "location": { "index": "rtree", "filename": "places-rtree-location.dat" }
                    }
                }),
            );

        let mut rows = HashMap::new();
        rows.insert(
            "users".to_string(),
            vec![
                row(json!({ "id": 1, "name": "ana", "email": "ana@example.com" })),
                row(json!({ "id": 2, "name": "luis", "email": null })),
            ],
        );
        rows.insert(
            "places".to_string(),
            vec![row(json!({ "code": 10, "location": "(3.5, 1.25)" }))],
        );

        Self {
            catalog,
            rows,
            ..Self::default()
        }
    }

    /// Queues a response for the next `execute` call.
    pub fn push_query_response(&self, response: Envelope<QueryOutcome>) {
        lock(&self.query_script).push_back(response);
    }

    /// Queues a response for the next `list_tables` call.
    pub fn push_tables_response(&self, response: Envelope<TableCatalog>) {
        lock(&self.tables_script).push_back(response);
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }

    /// Built-in answer for a query when nothing is scripted.
    fn answer(&self, content: &str) -> QueryOutcome {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return engine_error("EMPTY_QUERY", "Empty query");
        }

        let upper = trimmed.to_uppercase();
        if !upper.starts_with("SELECT") {
            let result = StatementResult {
                ok: Some(true),
                kind: Some("command".to_string()),
                count: Some(0),
                message: Some("Statement accepted.".to_string()),
                meta: meta(0.2, None),
                ..StatementResult::default()
            };
            return ok_outcome(result);
        }

        let Some(table) = table_after_from(trimmed) else {
            return engine_error("PARSE_ERROR", "Expected FROM <table>");
        };
        let Some(data) = self.rows.get(&table) else {
            return engine_error("NO_TABLE", &format!("Table '{table}' does not exist"));
        };

        let mut io = Map::new();
        io.insert(
            "heap".to_string(),
            json!({ "read_count": data.len(), "write_count": 0 }),
        );
        let plan = json!({ "action": "select", "table": table, "columns": null, "where": null });

        let result = StatementResult {
            ok: Some(true),
            kind: Some("query".to_string()),
            action: Some("select".to_string()),
            table: Some(table),
            count: Some(data.len() as u64),
            data: data.clone(),
            meta: meta(1.0, Some(IoStats::from_wire(&io))),
            plan: plan.as_object().cloned().map(PlanInfo::new),
            ..StatementResult::default()
        };
        ok_outcome(result)
    }
}

#[async_trait]
impl QueryService for MockQueryService {
    async fn list_tables(&self) -> Envelope<TableCatalog> {
        self.record(MockCall::ListTables);
        if let Some(scripted) = lock(&self.tables_script).pop_front() {
            return scripted;
        }
        Ok(self.catalog.clone())
    }

    async fn execute(&self, request: &QueryRequest) -> Envelope<QueryOutcome> {
        self.record(MockCall::Execute(request.content.clone()));
        if let Some(scripted) = lock(&self.query_script).pop_front() {
            return scripted;
        }
        Ok(self.answer(&request.content))
    }

    fn describe(&self) -> String {
        "mock://demo".to_string()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panic while holding the lock only happens in a failing test.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn meta(time_ms: f64, io: Option<IoStats>) -> StatementMeta {
    StatementMeta {
        time_ms: Some(time_ms),
        io,
        extra: Map::new(),
    }
}

fn ok_outcome(result: StatementResult) -> QueryOutcome {
    QueryOutcome {
        ok: true,
        stats: ExecutionStats {
            time_ms: result.meta.time_ms,
        },
        results: vec![result],
        schema: Some("bd2.v1".to_string()),
        warnings: Vec::new(),
    }
}

fn engine_error(code: &str, message: &str) -> QueryOutcome {
    QueryOutcome {
        ok: false,
        results: vec![StatementResult {
            ok: Some(false),
            error: Some(EngineFailure {
                code: Some(code.to_string()),
                message: message.to_string(),
                origin: Some("executor".to_string()),
                detail: None,
            }),
            ..StatementResult::default()
        }],
        stats: ExecutionStats { time_ms: Some(0.1) },
        schema: Some("bd2.v1".to_string()),
        warnings: Vec::new(),
    }
}

/// Extracts the identifier following `FROM`, without a trailing `;`.
fn table_after_from(sql: &str) -> Option<String> {
    let mut words = sql.split_whitespace();
    words.find(|word| word.eq_ignore_ascii_case("from"))?;
    let table = words.next()?.trim_end_matches(';');
    (!table.is_empty()).then(|| table.to_lowercase())
}
