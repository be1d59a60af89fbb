//! Schema and index view model for the table sidebar.
//!
//! Turns the raw `{ relation, indexes }` catalog entries into display rows,
//! one per column, annotated with type, primary-key flag and index kind.
//! Interpretation is lenient throughout: missing or malformed pieces degrade
//! to empty values and never fail the whole catalog.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::api::TableCatalog;

/// Key under which the primary index is stored in `indexes`.
pub const PRIMARY_INDEX_KEY: &str = "primary";

/// Storage structure backing an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Hash,
    Bplus,
    Rtree,
    Heap,
    Sequential,
    Isam,
}

impl IndexKind {
    /// Parses a wire index method, case-insensitively.
    ///
    /// `b+` and `btree` are accepted for B+ trees since the engine's DDL
    /// defaults to `b+`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hash" => Some(Self::Hash),
            "bplus" | "b+" | "btree" | "b+tree" => Some(Self::Bplus),
            "rtree" | "r-tree" => Some(Self::Rtree),
            "heap" => Some(Self::Heap),
            "sequential" | "seq" => Some(Self::Sequential),
            "isam" => Some(Self::Isam),
            _ => None,
        }
    }

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Bplus => "bplus",
            Self::Rtree => "rtree",
            Self::Heap => "heap",
            Self::Sequential => "sequential",
            Self::Isam => "isam",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hash => "Hash",
            Self::Bplus => "B+ Tree",
            Self::Rtree => "R-Tree",
            Self::Heap => "Heap",
            Self::Sequential => "Sequential",
            Self::Isam => "ISAM",
        }
    }

    /// Short badge for narrow columns.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Hash => "H",
            Self::Bplus => "B+",
            Self::Rtree => "R",
            Self::Heap => "HP",
            Self::Sequential => "SEQ",
            Self::Isam => "ISAM",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column attributes from a `relation` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSpec {
    pub type_name: String,
    pub length: Option<u64>,
    pub primary_key: bool,
}

impl ColumnSpec {
    /// Reads a column spec, tolerating missing or oddly-typed fields.
    pub fn from_value(value: &Value) -> Self {
        let type_name = match value.get("type") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let length = value.get("length").and_then(|length| {
            length
                .as_u64()
                .or_else(|| length.as_str().and_then(|s| s.trim().parse().ok()))
        });
        let primary_key = value
            .get("key")
            .and_then(Value::as_str)
            .is_some_and(|key| key.eq_ignore_ascii_case(PRIMARY_INDEX_KEY));

        Self {
            type_name,
            length,
            primary_key,
        }
    }

    /// Display type, with the length appended when present (e.g. `varchar(32)`).
    pub fn display_type(&self) -> String {
        match self.length {
            Some(length) => format!("{}({})", self.type_name, length),
            None => self.type_name.clone(),
        }
    }
}

/// Index attributes from an `indexes` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSpec {
    /// Resolved kind; `None` for unknown or missing methods.
    pub kind: Option<IndexKind>,
    pub filename: Option<String>,
}

impl IndexSpec {
    pub fn from_value(value: &Value) -> Self {
        Self {
            kind: value
                .get("index")
                .and_then(Value::as_str)
                .and_then(IndexKind::parse),
            filename: value
                .get("filename")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }
}

/// One sidebar row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub name: String,
    /// Type with length, e.g. `varchar(32)`.
    pub type_label: String,
    pub primary_key: bool,
    /// Resolved index kind; no badge is shown when `None`.
    pub index: Option<IndexKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_file: Option<String>,
}

/// A table with its columns in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub name: String,
    pub columns: Vec<ColumnView>,
}

impl TableView {
    /// Builds the view for one catalog entry.
    ///
    /// The index for a column is the entry keyed by the column name; a
    /// primary-key column without one falls back to the `"primary"` entry.
    pub fn build(name: &str, entry: &Value) -> Self {
        let empty = Map::new();
        let relation = entry
            .get("relation")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let indexes = entry
            .get("indexes")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let columns = relation
            .iter()
            .map(|(column, raw)| {
                let spec = ColumnSpec::from_value(raw);
                let index = resolve_index(indexes, column, spec.primary_key);
                ColumnView {
                    name: column.clone(),
                    type_label: spec.display_type(),
                    primary_key: spec.primary_key,
                    index: index.as_ref().and_then(|i| i.kind),
                    index_file: index.and_then(|i| i.filename),
                }
            })
            .collect();

        Self {
            name: name.to_string(),
            columns,
        }
    }

    /// Returns the primary-key column, if one is flagged.
    pub fn primary_key(&self) -> Option<&ColumnView> {
        self.columns.iter().find(|column| column.primary_key)
    }
}

fn resolve_index(indexes: &Map<String, Value>, column: &str, primary_key: bool) -> Option<IndexSpec> {
    let by_column = indexes
        .get(column)
        .map(IndexSpec::from_value)
        .filter(|spec| spec.kind.is_some());

    by_column.or_else(|| {
        primary_key
            .then(|| indexes.get(PRIMARY_INDEX_KEY))
            .flatten()
            .map(IndexSpec::from_value)
            .filter(|spec| spec.kind.is_some())
    })
}

/// Builds views for every table in the catalog, in catalog order.
pub fn build_catalog(catalog: &TableCatalog) -> Vec<TableView> {
    catalog
        .iter()
        .map(|(name, entry)| TableView::build(name, entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn users_entry() -> Value {
        json!({
            "relation": {
                "id": { "type": "int", "key": "primary" },
                "name": { "type": "varchar", "length": 32 },
                "age": { "type": "int" }
            },
            "indexes": {
                "primary": { "index": "bplus", "filename": "users-bplus-id.dat" },
                "name": { "index": "hash", "filename": "users-hash-name.dat" }
            }
        })
    }

    #[test]
    fn test_build_table_columns_in_declared_order() {
        let table = TableView::build("users", &users_entry());
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
    }

    #[test]
    fn test_type_label_includes_length() {
        let table = TableView::build("users", &users_entry());
        assert_eq!(table.columns[0].type_label, "int");
        assert_eq!(table.columns[1].type_label, "varchar(32)");
    }

    #[test]
    fn test_primary_key_falls_back_to_primary_index() {
        let table = TableView::build("users", &users_entry());
        let id = &table.columns[0];
        assert!(id.primary_key);
        assert_eq!(id.index, Some(IndexKind::Bplus));
        assert_eq!(id.index_file.as_deref(), Some("users-bplus-id.dat"));
        assert_eq!(table.primary_key().map(|c| c.name.as_str()), Some("id"));
    }

    #[test]
    fn test_column_keyed_index_wins_over_primary() {
        let entry = json!({
            "relation": { "id": { "type": "int", "key": "primary" } },
            "indexes": {
                "primary": { "index": "heap" },
                "id": { "index": "isam" }
            }
        });
        let table = TableView::build("t", &entry);
        assert_eq!(table.columns[0].index, Some(IndexKind::Isam));
    }

    #[test]
    fn test_non_key_column_does_not_use_primary_index() {
        let table = TableView::build("users", &users_entry());
        let age = &table.columns[2];
        assert!(!age.primary_key);
        assert_eq!(age.index, None);
        assert_eq!(table.columns[1].index, Some(IndexKind::Hash));
    }

    #[test]
    fn test_missing_relation_yields_no_columns() {
        let table = TableView::build("t", &json!({ "indexes": { "primary": { "index": "heap" } } }));
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_missing_indexes_yields_no_badges() {
        let table = TableView::build("t", &json!({ "relation": { "a": { "type": "int" } } }));
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].index, None);
    }

    #[test]
    fn test_malformed_entry_never_panics() {
        for entry in [
            json!(null),
            json!("users"),
            json!({ "relation": 3, "indexes": [] }),
            json!({ "relation": { "a": 7, "b": null }, "indexes": { "a": "hash" } }),
        ] {
            let table = TableView::build("t", &entry);
            assert!(table.columns.iter().all(|c| c.index.is_none()));
        }
    }

    #[test]
    fn test_unknown_index_kind_yields_no_badge() {
        let entry = json!({
            "relation": { "a": { "type": "int" } },
            "indexes": { "a": { "index": "quadtree" } }
        });
        assert_eq!(TableView::build("t", &entry).columns[0].index, None);
    }

    #[test]
    fn test_index_kind_parse_aliases() {
        assert_eq!(IndexKind::parse("b+"), Some(IndexKind::Bplus));
        assert_eq!(IndexKind::parse("BPLUS"), Some(IndexKind::Bplus));
        assert_eq!(IndexKind::parse("rtree"), Some(IndexKind::Rtree));
        assert_eq!(IndexKind::parse("Sequential"), Some(IndexKind::Sequential));
        assert_eq!(IndexKind::parse(""), None);
    }

    #[test]
    fn test_index_kind_labels() {
        assert_eq!(IndexKind::Bplus.label(), "B+ Tree");
        assert_eq!(IndexKind::Isam.badge(), "ISAM");
        assert_eq!(IndexKind::Rtree.to_string(), "R-Tree");
        assert_eq!(IndexKind::Heap.as_str(), "heap");
    }

    #[test]
    fn test_column_spec_string_length() {
        let spec = ColumnSpec::from_value(&json!({ "type": "char", "length": "8" }));
        assert_eq!(spec.display_type(), "char(8)");
    }

    #[test]
    fn test_build_catalog_order() {
        let catalog = TableCatalog::new()
            .with_table("users", users_entry())
            .with_table("empty", json!({}));
        let views = build_catalog(&catalog);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "users");
        assert!(views[1].columns.is_empty());
    }
}
