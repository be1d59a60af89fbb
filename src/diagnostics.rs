//! Diagnostics shaping: I/O counters and execution plan.

use serde::Serialize;
use serde_json::Value;

use crate::api::{IoStats, PlanInfo};
use crate::results::display_value;

/// Plan fields rendered individually, in this order, when present.
pub const KNOWN_PLAN_FIELDS: [&str; 4] = ["action", "table", "columns", "where"];

/// One line of the I/O table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IoLine {
    pub resource: String,
    pub reads: u64,
    pub writes: u64,
}

/// I/O table with totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IoReport {
    pub lines: Vec<IoLine>,
    pub total_reads: u64,
    pub total_writes: u64,
}

impl IoReport {
    pub fn from_stats(stats: &IoStats) -> Self {
        let lines: Vec<IoLine> = stats
            .entries()
            .iter()
            .map(|entry| IoLine {
                resource: entry.resource.clone(),
                reads: entry.counter.read_count,
                writes: entry.counter.write_count,
            })
            .collect();
        // Counters come straight off the wire; totals clamp at u64::MAX.
        let total_reads = lines.iter().fold(0u64, |acc, line| acc.saturating_add(line.reads));
        let total_writes = lines
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.writes));

        Self {
            lines,
            total_reads,
            total_writes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Plan inspector content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    /// Known fields present in the plan, formatted.
    pub fields: Vec<(String, String)>,
    /// Whole plan, pretty-printed, so unknown fields are never lost.
    pub raw: String,
}

impl PlanReport {
    pub fn from_plan(plan: &PlanInfo) -> Self {
        let fields = KNOWN_PLAN_FIELDS
            .iter()
            .filter_map(|name| {
                plan.get(name)
                    .map(|value| (name.to_string(), format_plan_value(value)))
            })
            .collect();
        let raw = serde_json::to_string_pretty(plan.fields()).unwrap_or_default();

        Self { fields, raw }
    }
}

/// Formats one plan value.
///
/// `null` is shown literally, arrays are joined with `, `, objects are
/// JSON-encoded and scalars are shown as-is.
pub fn format_plan_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
        scalar => display_value(scalar),
    }
}

/// Diagnostics of the first statement of a successful execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io: Option<IoReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanReport>,
}

impl Diagnostics {
    pub fn new(io: Option<&IoStats>, plan: Option<&PlanInfo>) -> Self {
        Self {
            io: io.map(IoReport::from_stats),
            plan: plan.map(PlanReport::from_plan),
        }
    }

    /// True when neither I/O counters nor a plan were reported.
    pub fn is_empty(&self) -> bool {
        self.io.is_none() && self.plan.is_none()
    }
}
