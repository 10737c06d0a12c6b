// LogVista - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal
// chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogVista operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum VistaError {
    /// Source discovery failed (fatal: no sources could be enumerated).
    Discovery(DiscoveryError),

    /// The load pipeline failed as a whole.
    Load(LoadError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for VistaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for VistaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to source enumeration.  All variants are fatal: if the
/// source list itself cannot be produced there is nothing to load.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The local root path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The local root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The remote content listing could not be fetched.
    Listing { url: String, source: reqwest::Error },

    /// The remote content listing body was not valid JSON of the
    /// expected shape.
    ListingDecode {
        url: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Source path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Source path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Listing { url, source } => {
                write!(f, "Cannot fetch file listing from '{url}': {source}")
            }
            Self::ListingDecode { url, source } => {
                write!(f, "Cannot decode file listing from '{url}': {source}")
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Listing { source, .. } => Some(source),
            Self::ListingDecode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for VistaError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Ingest errors (per-source, non-fatal)
// ---------------------------------------------------------------------------

/// Errors parsing or fetching a single source file.
///
/// These never abort the load: the failing source is recorded as a
/// warning and skipped, and the pipeline continues with the remaining
/// sources.
#[derive(Debug)]
pub enum IngestError {
    /// CSV parsing failed.
    Csv { name: String, source: csv::Error },

    /// The .xlsx container (a zip archive) could not be opened or a
    /// required member is missing.
    XlsxContainer {
        name: String,
        source: zip::result::ZipError,
    },

    /// A required worksheet part is missing from the archive.
    XlsxMissingPart { name: String, part: String },

    /// Worksheet XML could not be parsed.
    XlsxXml {
        name: String,
        source: quick_xml::Error,
    },

    /// Fetching the source over HTTP failed.
    Fetch { name: String, source: reqwest::Error },

    /// Reading the source from disk failed.
    Io { name: String, source: io::Error },

    /// The source exceeds the per-file size bound.
    TooLarge { name: String, size: u64, max: u64 },

    /// The file extension maps to no known tabular format.
    UnsupportedFormat { name: String },
}

impl IngestError {
    /// Name of the source this error belongs to, for warning messages.
    pub fn source_name(&self) -> &str {
        match self {
            Self::Csv { name, .. }
            | Self::XlsxContainer { name, .. }
            | Self::XlsxMissingPart { name, .. }
            | Self::XlsxXml { name, .. }
            | Self::Fetch { name, .. }
            | Self::Io { name, .. }
            | Self::TooLarge { name, .. }
            | Self::UnsupportedFormat { name } => name,
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { name, source } => write!(f, "'{name}': CSV parse error: {source}"),
            Self::XlsxContainer { name, source } => {
                write!(f, "'{name}': cannot open spreadsheet container: {source}")
            }
            Self::XlsxMissingPart { name, part } => {
                write!(f, "'{name}': spreadsheet is missing part '{part}'")
            }
            Self::XlsxXml { name, source } => {
                write!(f, "'{name}': worksheet XML error: {source}")
            }
            Self::Fetch { name, source } => write!(f, "'{name}': fetch failed: {source}"),
            Self::Io { name, source } => write!(f, "'{name}': I/O error: {source}"),
            Self::TooLarge { name, size, max } => write!(
                f,
                "'{name}' is {size} bytes, exceeds maximum of {max} bytes"
            ),
            Self::UnsupportedFormat { name } => {
                write!(f, "'{name}': unsupported file format")
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source, .. } => Some(source),
            Self::XlsxContainer { source, .. } => Some(source),
            Self::XlsxXml { source, .. } => Some(source),
            Self::Fetch { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Fatal failures of the load pipeline as a whole.
#[derive(Debug)]
pub enum LoadError {
    /// Source discovery failed before any file could be read.
    Discovery(DiscoveryError),

    /// Every discovered source failed to parse; there is no data to show.
    NoData { sources_attempted: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "{e}"),
            Self::NoData { sources_attempted } => write!(
                f,
                "No data could be loaded from any of the {sources_attempted} source file(s)"
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::NoData { .. } => None,
        }
    }
}

impl From<DiscoveryError> for LoadError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

impl From<LoadError> for VistaError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// Spreadsheet container write error.
    Xlsx {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    /// Export would exceed the maximum row count.
    TooManyRows { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Xlsx { path, source } => {
                write!(f, "Spreadsheet export error '{}': {source}", path.display())
            }
            Self::TooManyRows { count, max } => write!(
                f,
                "Export of {count} rows exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Xlsx { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for VistaError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for VistaError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogVista results.
pub type Result<T> = std::result::Result<T, VistaError>;
