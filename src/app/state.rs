// LogVista - app/state.rs
//
// Application state management. Holds the session, load results,
// filter widget inputs, selection, and dialog flags.
// Owned by the eframe::App implementation.

use crate::app::loader::LoadOutcome;
use crate::app::session::Session;
use crate::app::source::SourceMode;
use crate::core::filter::FilterConfig;
use crate::core::model::{LoadSummary, LogRow};
use crate::core::region::Region;
use crate::util::constants;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;

/// Raw filter widget inputs, converted to a `FilterConfig` snapshot on
/// each Apply. Dates are kept as text (the sidebar uses plain text
/// inputs) and validated at submit time.
#[derive(Debug, Clone, Default)]
pub struct FilterInputs {
    /// Start date, `YYYY-MM-DD`. Empty = no date bound.
    pub date_start: String,

    /// End date, `YYYY-MM-DD`. Empty = no date bound.
    pub date_end: String,

    pub include_exceptions: HashSet<String>,
    pub exclude_exceptions: HashSet<String>,
    pub object_names: HashSet<String>,
    pub regions: HashSet<Region>,
    pub text_search: String,
}

impl FilterInputs {
    /// Build the immutable filter snapshot, validating the date inputs.
    pub fn to_config(&self) -> Result<FilterConfig, String> {
        let mut config = FilterConfig {
            include_exceptions: self.include_exceptions.clone(),
            exclude_exceptions: self.exclude_exceptions.clone(),
            object_names: self.object_names.clone(),
            regions: self.regions.clone(),
            text_search: self.text_search.trim().to_string(),
            ..Default::default()
        };

        let start = parse_date_input(&self.date_start)?;
        let end = parse_date_input(&self.date_end)?;
        match (start, end) {
            (Some(s), Some(e)) => {
                if s > e {
                    return Err("Start date is after end date.".to_string());
                }
                config.set_date_range(s, e);
            }
            (None, None) => {}
            _ => {
                return Err("Enter both start and end dates, or neither.".to_string());
            }
        }

        Ok(config)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn parse_date_input(input: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, constants::DATE_INPUT_FORMAT)
        .map(Some)
        .map_err(|_| format!("Invalid date '{trimmed}' (expected YYYY-MM-DD)."))
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Where the source files come from (fixed at startup from config).
    pub source_mode: SourceMode,

    /// Current session over the loaded table. None until a load succeeds.
    pub session: Option<Session>,

    /// Summary of the most recent completed load.
    pub summary: Option<LoadSummary>,

    /// Non-fatal warnings accumulated during the load.
    pub warnings: Vec<String>,

    /// Fatal load failure, surfaced in the status bar and summary window.
    pub load_error: Option<String>,

    /// Status message for the status bar.
    pub status_message: String,

    /// Filter sidebar inputs.
    pub filter_inputs: FilterInputs,

    /// Validation error from the last Apply attempt.
    pub filter_error: Option<String>,

    /// Position of the selected row within the current view.
    pub selected_row: Option<usize>,

    /// Whether to show the load summary dialog.
    pub show_summary: bool,

    /// A panel requested a cache-invalidating reload.
    pub request_reload: bool,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(source_mode: SourceMode, debug_mode: bool) -> Self {
        Self {
            source_mode,
            session: None,
            summary: None,
            warnings: Vec::new(),
            load_error: None,
            status_message: "Loading...".to_string(),
            filter_inputs: FilterInputs::default(),
            filter_error: None,
            selected_row: None,
            show_summary: false,
            request_reload: false,
            debug_mode,
        }
    }

    /// Install a completed load: start a session on the table (default
    /// 2-day window) and surface the summary signal.
    pub fn install_outcome(&mut self, outcome: &Arc<LoadOutcome>) {
        self.session = Some(Session::new(Arc::clone(&outcome.table)));
        self.status_message = outcome.summary.status_line();
        self.summary = Some(outcome.summary.clone());
        self.warnings = outcome.warnings.clone();
        self.load_error = None;
        self.selected_row = None;
        self.filter_error = None;
    }

    /// Install a fatal load failure. The session (if any) is dropped so
    /// the UI shows the failure rather than stale data.
    pub fn install_load_failure(&mut self, message: String) {
        self.session = None;
        self.summary = None;
        self.selected_row = None;
        self.status_message = message.clone();
        self.load_error = Some(message);
    }

    /// Apply the current sidebar inputs as a new filter snapshot.
    pub fn apply_filter_inputs(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match self.filter_inputs.to_config() {
            Ok(config) => {
                session.on_filter_submit(config);
                self.filter_error = None;
                self.selected_row = None;
                self.status_message = format!("Showing {} rows.", session.view().len());
            }
            Err(msg) => {
                self.filter_error = Some(msg);
            }
        }
    }

    /// Clear the sidebar and return to the default window.
    pub fn reset_filters(&mut self) {
        self.filter_inputs.clear();
        self.filter_error = None;
        self.selected_row = None;
        if let Some(session) = self.session.as_mut() {
            session.reset_to_default();
            self.status_message = format!("Showing {} rows.", session.view().len());
        }
    }

    /// The currently selected row, if any.
    pub fn selected_entry(&self) -> Option<&LogRow> {
        let session = self.session.as_ref()?;
        let view_pos = self.selected_row?;
        let &row_idx = session.view().get(view_pos)?;
        session.table().rows.get(row_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_inputs_date_validation() {
        let mut inputs = FilterInputs {
            date_start: "2024-06-01".to_string(),
            date_end: "2024-06-02".to_string(),
            ..Default::default()
        };
        let config = inputs.to_config().unwrap();
        assert!(config.time_start.is_some());
        assert_eq!(
            config.time_end.unwrap().format("%H:%M:%S").to_string(),
            "23:59:59"
        );

        inputs.date_end.clear();
        assert!(inputs.to_config().is_err(), "half-open range rejected");

        inputs.date_end = "2024-05-01".to_string();
        assert!(inputs.to_config().is_err(), "inverted range rejected");

        inputs.date_start = "junk".to_string();
        assert!(inputs.to_config().is_err(), "malformed date rejected");
    }

    #[test]
    fn test_filter_inputs_empty_is_unrestricted() {
        let config = FilterInputs::default().to_config().unwrap();
        assert!(config.is_empty());
    }
}
