//! Row grid model for the results pane.
//!
//! Headers are the keys of the first row, in that row's order. Every row is
//! looked up by key against those headers, so rows with a different key set
//! render a blank cell for missing keys instead of shifting columns; keys that
//! the first row does not have are not shown.

use serde::Serialize;
use serde_json::Value;

use crate::api::Row;

/// One rendered cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    /// The wire value was JSON `null`.
    pub is_null: bool,
    /// The row had no value for this column.
    pub is_missing: bool,
}

impl Cell {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            None => Self {
                text: String::new(),
                is_null: false,
                is_missing: true,
            },
            Some(Value::Null) => Self {
                text: "null".to_string(),
                is_null: true,
                is_missing: false,
            },
            Some(value) => Self {
                text: display_value(value),
                is_null: false,
                is_missing: false,
            },
        }
    }
}

/// Formats a scalar for display: strings unquoted, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Display-ready grid of a statement's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultGrid {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl ResultGrid {
    /// Builds the grid from wire rows.
    pub fn from_rows(rows: &[Row]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };

        let headers: Vec<String> = first.keys().cloned().collect();
        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|header| Cell::from_value(row.get(header)))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to show; the UI renders a placeholder.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
