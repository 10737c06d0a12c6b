// LogVista - core/filter.rs
//
// Composable filter engine for the normalised log table.
// All active predicates are AND-combined.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{LogRow, LogTable};
use crate::core::region::Region;
use crate::util::constants;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

/// An immutable snapshot of filter criteria. All fields are
/// AND-combined when applied; an empty set / `None` / empty string
/// means "no restriction" for that predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    /// Start of the datetime range (inclusive). None = no lower bound.
    pub time_start: Option<NaiveDateTime>,

    /// End of the datetime range (inclusive). None = no upper bound.
    pub time_end: Option<NaiveDateTime>,

    /// `Exception` values to include (empty = all).
    pub include_exceptions: HashSet<String>,

    /// `Exception` values to exclude. Applied after the include set, so
    /// a value present in both is excluded.
    pub exclude_exceptions: HashSet<String>,

    /// `Object Name` values to include (empty = all).
    pub object_names: HashSet<String>,

    /// Regions to include (empty = all).
    pub regions: HashSet<Region>,

    /// Substring text search over every column's string representation
    /// (case-insensitive). Empty = no filter.
    pub text_search: String,
}

impl FilterConfig {
    /// Returns true if no predicates are active.
    pub fn is_empty(&self) -> bool {
        self.time_start.is_none()
            && self.time_end.is_none()
            && self.include_exceptions.is_empty()
            && self.exclude_exceptions.is_empty()
            && self.object_names.is_empty()
            && self.regions.is_empty()
            && self.text_search.is_empty()
    }

    /// Set the datetime bounds from an inclusive date range spanning
    /// full days.
    ///
    /// The end boundary is start-of-next-day minus one second, NOT
    /// end-of-day 23:59:59.999 -- millisecond-precision timestamps in
    /// the final second of the range are deliberately outside it.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.time_start = start.and_hms_opt(0, 0, 0);
        self.time_end = end
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt - Duration::seconds(1));
    }

    /// The default view: the most recent 2 full days up to the newest
    /// timestamp in the table, with the same end-boundary rule as
    /// explicit date filters.
    ///
    /// A table with no usable `Datetime` yields an unrestricted config
    /// (full table).
    pub fn default_window(table: &LogTable) -> Self {
        let mut config = Self::default();
        if let Some(max) = table.max_datetime() {
            config.time_start = Some(max - Duration::days(constants::DEFAULT_WINDOW_DAYS));
            config.time_end = Some(max + Duration::days(1) - Duration::seconds(1));
        }
        config
    }
}

/// Apply a filter config to the table, returning indices of matching rows.
///
/// Returns a Vec of indices into `table.rows`. This avoids copying rows
/// and enables virtual scrolling on the filtered view. Pure function:
/// the same table and config always produce the same output.
pub fn apply_filters(table: &LogTable, config: &FilterConfig) -> Vec<usize> {
    if config.is_empty() {
        return (0..table.rows.len()).collect();
    }

    let text_lower = config.text_search.to_lowercase();

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches_all(row, table, config, &text_lower))
        .map(|(idx, _)| idx)
        .collect()
}

/// Check if a single row matches all active predicates.
/// Cheap set-membership predicates run before the text scan.
fn matches_all(row: &LogRow, table: &LogTable, config: &FilterConfig, text_lower: &str) -> bool {
    // Region filter
    if !config.regions.is_empty() && !config.regions.contains(&row.region) {
        return false;
    }

    // Include-error-type filter
    if !config.include_exceptions.is_empty() {
        match row.exception {
            Some(ref exc) if config.include_exceptions.contains(exc) => {}
            _ => return false,
        }
    }

    // Exclude-error-type filter (runs after include: exclusion wins).
    if !config.exclude_exceptions.is_empty() {
        if let Some(ref exc) = row.exception {
            if config.exclude_exceptions.contains(exc) {
                return false;
            }
        }
    }

    // Object-name filter
    if !config.object_names.is_empty() {
        match row.object_name {
            Some(ref obj) if config.object_names.contains(obj) => {}
            _ => return false,
        }
    }

    // Datetime range. Rows without a timestamp are excluded whenever a
    // bound is active.
    if let Some(ref start) = config.time_start {
        match row.datetime {
            Some(dt) if dt < *start => return false,
            None => return false,
            _ => {}
        }
    }
    if let Some(ref end) = config.time_end {
        match row.datetime {
            Some(dt) if dt > *end => return false,
            None => return false,
            _ => {}
        }
    }

    // Free-text search: case-insensitive substring over the string
    // representation of every column, derived fields included. Empty
    // cells contribute no match.
    if !text_lower.is_empty() {
        let hit = table
            .columns
            .iter()
            .any(|col| row.cell(col).to_lowercase().contains(text_lower));
        if !hit {
            return false;
        }
    }

    true
}
