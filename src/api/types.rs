//! Wire types exchanged with the query service.
//!
//! Field order in JSON objects is preserved (`serde_json/preserve_order`),
//! which the result grid and the schema sidebar both rely on.

use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw query text, sent as typed.
    pub content: String,
}

impl QueryRequest {
    /// Creates a request for the given query text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A single result row: column name to scalar value, in wire order.
pub type Row = Map<String, Value>;

/// Envelope returned by `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Whether every statement in the batch succeeded.
    pub ok: bool,

    /// One result per statement, in execution order.
    #[serde(default)]
    pub results: Vec<StatementResult>,

    /// Batch-level statistics.
    #[serde(default)]
    pub stats: ExecutionStats,

    /// Response schema tag (e.g. `bd2.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Engine warnings, kept opaque.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Value>,
}

impl QueryOutcome {
    /// Returns the first statement result, the only one surfaced to the user.
    pub fn first(&self) -> Option<&StatementResult> {
        self.results.first()
    }

    /// Returns the batch execution time, if reported.
    pub fn total_time_ms(&self) -> Option<f64> {
        self.stats.time_ms
    }
}

/// Batch-level statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<f64>,
}

/// Result of one statement in a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,

    /// Statement kind reported by the engine (e.g. `query`, `ddl`, `dml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Planner action (e.g. `select`, `insert`, `create_index`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Rows returned or affected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(default, deserialize_with = "rows_or_null")]
    pub data: Vec<Row>,

    #[serde(default)]
    pub meta: StatementMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanInfo>,

    /// Engine message for statements without rows (e.g. "Tabla creada.").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EngineFailure>,
}

fn rows_or_null<'de, D>(deserializer: D) -> Result<Vec<Row>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Row>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-statement metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<f64>,

    /// Page I/O counters keyed by resource kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<IoStats>,

    /// Anything else the engine reports (e.g. `affected`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Statement-level failure reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default)]
    pub message: String,

    /// Engine component that raised the failure.
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

/// Execution plan, kept as an open record so unknown fields survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanInfo(Map<String, Value>);

impl PlanInfo {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns all fields in wire order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read/write counters for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IoCounter {
    pub read_count: u64,
    pub write_count: u64,
}

impl IoCounter {
    pub fn new(read_count: u64, write_count: u64) -> Self {
        Self {
            read_count,
            write_count,
        }
    }

    /// Normalizes a wire counter record.
    ///
    /// The engine is not consistent about field spelling, so both
    /// `read_count`/`readCount` and `write_count`/`writeCount` are accepted.
    /// Missing or non-numeric counters read as zero.
    pub fn from_wire(value: &Value) -> Self {
        Self {
            read_count: counter_field(value, "read_count", "readCount"),
            write_count: counter_field(value, "write_count", "writeCount"),
        }
    }
}

fn counter_field(value: &Value, snake: &str, camel: &str) -> u64 {
    [snake, camel]
        .into_iter()
        .find_map(|key| value.get(key).and_then(as_count))
        .unwrap_or(0)
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|count| count.is_finite() && *count >= 0.0)
            .map(|count| count as u64)
    })
}

/// One entry of the I/O statistics mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoEntry {
    /// Resource-kind label (e.g. `page_cache`, `heap`, `bplus`).
    pub resource: String,
    #[serde(flatten)]
    pub counter: IoCounter,
}

/// I/O statistics, normalized at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoStats {
    entries: Vec<IoEntry>,
}

impl IoStats {
    /// Builds normalized statistics from the raw wire mapping.
    pub fn from_wire(raw: &Map<String, Value>) -> Self {
        let entries = raw
            .iter()
            .map(|(resource, counter)| IoEntry {
                resource: resource.clone(),
                counter: IoCounter::from_wire(counter),
            })
            .collect();
        Self { entries }
    }

    /// Returns the entries in wire order.
    pub fn entries(&self) -> &[IoEntry] {
        &self.entries
    }

    /// Looks up the counters for a resource kind.
    pub fn get(&self, resource: &str) -> Option<IoCounter> {
        self.entries
            .iter()
            .find(|entry| entry.resource == resource)
            .map(|entry| entry.counter)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for IoStats {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A non-object `io` payload is treated as "no statistics" rather than
        // failing the whole response.
        let raw = Value::deserialize(deserializer)?;
        Ok(match raw {
            Value::Object(map) => Self::from_wire(&map),
            _ => Self::default(),
        })
    }
}

impl Serialize for IoStats {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(
            self.entries
                .iter()
                .map(|entry| (&entry.resource, &entry.counter)),
        )
    }
}

/// Response of `GET /tables`: table name to raw `{ relation, indexes }` entry.
///
/// Entries are kept as raw JSON; [`crate::schema`] interprets them leniently
/// so a malformed table never breaks the rest of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableCatalog {
    tables: Map<String, Value>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: Value) {
        self.tables.insert(name.into(), entry);
    }

    /// Builder-style variant of [`TableCatalog::insert`].
    pub fn with_table(mut self, name: impl Into<String>, entry: Value) -> Self {
        self.insert(name, entry);
        self
    }

    /// Returns the raw entry for a table.
    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.tables.get(name)
    }

    /// Returns table names in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Iterates over `(name, entry)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.tables.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<'de> Deserialize<'de> for TableCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Entries(Map<String, Value>),
            // Older servers answer with a bare list of table names.
            Names(Vec<String>),
        }

        let tables = match Wire::deserialize(deserializer)? {
            Wire::Entries(tables) => tables,
            Wire::Names(names) => names
                .into_iter()
                .map(|name| (name, Value::Object(Map::new())))
                .collect(),
        };
        Ok(Self { tables })
    }
}
