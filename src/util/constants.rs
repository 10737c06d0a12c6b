// LogVista - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogVista";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogVista";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Source discovery limits
// =============================================================================

/// Maximum directory recursion depth during local discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Maximum number of source files ingested in a single load.
pub const DEFAULT_MAX_FILES: usize = 200;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 2_000;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Filename glob patterns a local file must match to be ingested.
pub const SOURCE_INCLUDE_PATTERNS: &[&str] = &["*.csv", "*.xlsx"];

/// File extensions accepted from a remote content listing.
pub const SOURCE_EXTENSIONS: &[&str] = &["csv", "xlsx"];

// =============================================================================
// Ingest limits
// =============================================================================

/// Maximum bytes accepted for a single source file.
/// Spreadsheet exports larger than this are almost certainly not log files.
pub const MAX_SOURCE_FILE_BYTES: u64 = 64 * 1024 * 1024; // 64 MB

/// Hard upper bound on the total number of rows held in memory at once.
///
/// When the cap is reached the load stops ingesting further sources and
/// emits a warning so the user knows data was truncated.
pub const MAX_TOTAL_ROWS: usize = 1_000_000;

/// Column-header prefix for auto-generated placeholder columns (index
/// columns saved without a name).  Columns matching it are dropped.
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed";

/// Well-known column headers the pipeline treats specially.
pub const COL_DATETIME: &str = "Datetime";
pub const COL_EXCEPTION: &str = "Exception";
pub const COL_OBJECT_NAME: &str = "Object Name";
pub const COL_REGION: &str = "Region";
pub const COL_HOUR: &str = "Hour";
pub const COL_HOUR_LABEL: &str = "Hour_Label";

// =============================================================================
// Remote fetch limits
// =============================================================================

/// HTTP timeout applied to the listing request and each file fetch.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Filtering & aggregation
// =============================================================================

/// Days of data shown by the default view (counted back from the newest
/// timestamp in the table).
pub const DEFAULT_WINDOW_DAYS: i64 = 2;

/// Number of entries shown by the top-error-type and top-object charts.
pub const TOP_N: usize = 10;

/// Timestamp format used for display, free-text search, and export.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format accepted by the filter sidebar's date inputs.
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Export
// =============================================================================

/// Maximum number of rows that can be exported in a single operation.
pub const MAX_EXPORT_ROWS: usize = 1_000_000;

/// Worksheet name used for spreadsheet export.
pub const EXPORT_SHEET_NAME: &str = "Filtered Logs";

// =============================================================================
// UI defaults
// =============================================================================

/// Maximum number of non-fatal warnings retained across a load.
pub const MAX_WARNINGS: usize = 500;

/// Maximum distinct values listed per filter checkbox group.
/// Keeps the sidebar usable on wide datasets.
pub const MAX_FILTER_OPTIONS: usize = 200;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
