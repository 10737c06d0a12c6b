// LogVista - app/session.rs
//
// The user's working session: the resident table, the active filter
// criteria, and the current filtered view.
//
// The table is read-only once built; the view is recomputed wholesale
// from (table, config) on every submission and replaced atomically --
// it is never mutated incrementally.

use crate::core::filter::{self, FilterConfig};
use crate::core::model::LogTable;
use std::sync::Arc;

/// Owns the current interaction state over a loaded table.
#[derive(Debug)]
pub struct Session {
    table: Arc<LogTable>,
    active_config: FilterConfig,
    current_view: Vec<usize>,
}

impl Session {
    /// Start a session on a freshly loaded table with the default
    /// 2-day window applied.
    pub fn new(table: Arc<LogTable>) -> Self {
        let active_config = FilterConfig::default_window(&table);
        let current_view = filter::apply_filters(&table, &active_config);
        tracing::debug!(
            rows = table.rows.len(),
            shown = current_view.len(),
            "Session started with default window"
        );
        Self {
            table,
            active_config,
            current_view,
        }
    }

    pub fn table(&self) -> &LogTable {
        &self.table
    }

    pub fn config(&self) -> &FilterConfig {
        &self.active_config
    }

    /// Indices into `table().rows` for the rows currently shown.
    pub fn view(&self) -> &[usize] {
        &self.current_view
    }

    /// Apply a new filter snapshot, replacing the displayed view.
    pub fn on_filter_submit(&mut self, config: FilterConfig) {
        self.current_view = filter::apply_filters(&self.table, &config);
        self.active_config = config;
        tracing::debug!(shown = self.current_view.len(), "Filter applied");
    }

    /// Back to the default 2-day window.
    pub fn reset_to_default(&mut self) {
        self.on_filter_submit(FilterConfig::default_window(&self.table));
    }
}
