// LogVista - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::core::region::Region;
use crate::util::constants;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

// =============================================================================
// Cell value
// =============================================================================

/// A dynamic cell value as parsed from a source file.
///
/// CSV cells arrive as text (or empty); .xlsx cells keep the type the
/// workbook stored. The `Display` impl defines the canonical string
/// representation used by free-text search, the data table, and export.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Value {
    /// True when the cell carries no content.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the cell, if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            // Integral numbers print without a trailing ".0" so exported
            // cells match what the source spreadsheet displayed.
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Empty => Ok(()),
        }
    }
}

// =============================================================================
// Log row
// =============================================================================

/// A single normalised log record.
///
/// Well-known fields are typed and optional; every other source column
/// passes through verbatim in `extra`. Absence is a first-class case
/// everywhere: a row from a file missing a column simply reads as empty
/// for that column.
#[derive(Debug, Clone, Default)]
pub struct LogRow {
    /// Raw `Datetime` cell as read from the source, kept for coercion.
    pub datetime_cell: Option<Value>,

    /// Coerced timestamp. `None` when the cell was absent or unparseable.
    pub datetime: Option<NaiveDateTime>,

    /// Free-text error-type label.
    pub exception: Option<String>,

    /// Free-text affected-resource label.
    pub object_name: Option<String>,

    /// Derived from the source filename; never null.
    pub region: Region,

    /// Hour-of-day bucket (0-23), derived from `datetime`.
    pub hour: Option<u32>,

    /// 12-hour clock label for `hour`.
    pub hour_label: Option<String>,

    /// Pass-through columns not covered by the well-known fields.
    pub extra: BTreeMap<String, Value>,
}

impl LogRow {
    /// String representation of this row's value in the named column.
    ///
    /// Empty string means the row has no value there (absent column,
    /// null field, or coerced-away timestamp). This single accessor
    /// backs free-text search, the data table, and export, so all three
    /// agree on what a cell "says".
    pub fn cell(&self, column: &str) -> String {
        match column {
            constants::COL_DATETIME => self
                .datetime
                .map(|dt| dt.format(constants::DATETIME_DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
            constants::COL_EXCEPTION => self.exception.clone().unwrap_or_default(),
            constants::COL_OBJECT_NAME => self.object_name.clone().unwrap_or_default(),
            constants::COL_REGION => self.region.label().to_string(),
            constants::COL_HOUR => self.hour.map(|h| h.to_string()).unwrap_or_default(),
            constants::COL_HOUR_LABEL => self.hour_label.clone().unwrap_or_default(),
            other => self
                .extra
                .get(other)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Log table
// =============================================================================

/// The normalised union of all ingested source files.
///
/// `columns` is the ordered union of column names seen in any
/// contributing file (first-seen order), with the derived `Region`,
/// `Hour`, and `Hour_Label` columns appended by the pipeline.
///
/// Invariants: every row has a non-null `region`; a column absent from
/// a row's source file reads as empty for that row rather than causing
/// a row/column mismatch.
#[derive(Debug, Clone, Default)]
pub struct LogTable {
    pub rows: Vec<LogRow>,
    pub columns: Vec<String>,
}

impl LogTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a column name if not already present, preserving order.
    pub fn add_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// Merge another file's column list into the union, first-seen order.
    pub fn merge_columns(&mut self, columns: &[String]) {
        for col in columns {
            self.add_column(col);
        }
    }

    /// Newest coerced timestamp in the table, if any.
    pub fn max_datetime(&self) -> Option<NaiveDateTime> {
        self.rows.iter().filter_map(|r| r.datetime).max()
    }

    /// Distinct non-null `Exception` values in first-seen row order.
    /// Used to populate the filter sidebar's option lists.
    pub fn unique_exceptions(&self) -> Vec<String> {
        Self::unique_values(self.rows.iter().filter_map(|r| r.exception.as_deref()))
    }

    /// Distinct non-null `Object Name` values in first-seen row order.
    pub fn unique_object_names(&self) -> Vec<String> {
        Self::unique_values(self.rows.iter().filter_map(|r| r.object_name.as_deref()))
    }

    /// Distinct regions present in the table, in `Region::all()` order.
    pub fn regions_present(&self) -> Vec<Region> {
        Region::all()
            .iter()
            .copied()
            .filter(|region| self.rows.iter().any(|r| r.region == *region))
            .collect()
    }

    fn unique_values<'a>(iter: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for v in iter {
            if seen.insert(v) {
                out.push(v.to_string());
            }
        }
        out
    }
}

// =============================================================================
// Load summary
// =============================================================================

/// Summary statistics for a completed load, consumed by the status bar
/// and the load-summary window.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Sources discovered (before any were skipped).
    pub files_discovered: usize,

    /// Sources that parsed successfully.
    pub files_loaded: usize,

    /// Total rows across all loaded sources.
    pub total_rows: usize,

    /// Per-source breakdown.
    pub source_summaries: Vec<SourceSummary>,

    /// Wall-clock load duration.
    pub duration: std::time::Duration,
}

impl LoadSummary {
    /// The one-line status signal shown after a successful load.
    pub fn status_line(&self) -> String {
        format!(
            "Loaded {} file(s) with {} rows.",
            self.files_loaded, self.total_rows
        )
    }
}

/// Per-source load statistics.
#[derive(Debug, Clone)]
pub struct SourceSummary {
    /// Source file name.
    pub name: String,

    /// Region assigned to the source's rows.
    pub region: Region,

    /// Number of rows contributed.
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn test_column_union_preserves_first_seen_order() {
        let mut table = LogTable::default();
        table.merge_columns(&["Datetime".into(), "Exception".into()]);
        table.merge_columns(&["Exception".into(), "Server".into()]);
        assert_eq!(table.columns, vec!["Datetime", "Exception", "Server"]);
    }

    #[test]
    fn test_cell_reads_well_known_and_extra_columns() {
        let mut row = LogRow {
            exception: Some("TimeoutException".into()),
            region: Region::Mumbai,
            ..Default::default()
        };
        row.extra
            .insert("Server".into(), Value::Text("app-01".into()));

        assert_eq!(row.cell("Exception"), "TimeoutException");
        assert_eq!(row.cell("Region"), "Mumbai");
        assert_eq!(row.cell("Server"), "app-01");
        // Absent column reads as empty, not as an error.
        assert_eq!(row.cell("Nope"), "");
        // Null datetime reads as empty.
        assert_eq!(row.cell("Datetime"), "");
    }

    #[test]
    fn test_unique_values_first_seen_order() {
        let table = LogTable {
            rows: vec![
                LogRow {
                    exception: Some("B".into()),
                    ..Default::default()
                },
                LogRow {
                    exception: Some("A".into()),
                    ..Default::default()
                },
                LogRow {
                    exception: Some("B".into()),
                    ..Default::default()
                },
                LogRow::default(),
            ],
            columns: vec![],
        };
        assert_eq!(table.unique_exceptions(), vec!["B", "A"]);
    }
}
