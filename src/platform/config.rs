// LogVista - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::app::source::SourceMode;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogVista configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logvista/ or %APPDATA%\LogVista\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a
/// newer config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[source]` section.
    pub source: SourceSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// "local" or "remote".
    pub mode: Option<String>,
    /// Local mode: root directory to scan.
    pub root: Option<String>,
    /// Remote mode: URL returning the JSON content listing.
    pub listing_url: Option<String>,
    /// Remote mode: base URL each listed file name is appended to.
    pub base_url: Option<String>,
    /// Maximum source files ingested per load.
    pub max_files: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where source files come from.
    pub source_mode: SourceMode,

    /// Maximum source files ingested per load.
    pub max_files: usize,

    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,

    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_mode: SourceMode::Local {
                root: PathBuf::from("data"),
            },
            max_files: constants::DEFAULT_MAX_FILES,
            dark_mode: true,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no
/// warnings (first-run). If the file is unparseable, returns defaults
/// with an error warning -- the application still starts but the user
/// is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults. \
                 See config.example.toml for the expected format.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// Validate each field, accumulating warnings for anything rejected.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Source: mode + addressing --
    match raw.source.mode.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("local") => {
            if let Some(root) = raw.source.root {
                config.source_mode = SourceMode::Local {
                    root: PathBuf::from(root),
                };
            }
        }
        Some("remote") => match (raw.source.listing_url, raw.source.base_url) {
            (Some(listing_url), Some(base_url)) => {
                config.source_mode = SourceMode::Remote {
                    listing_url,
                    base_url,
                };
            }
            _ => {
                warnings.push(
                    "[source] mode = \"remote\" requires both listing_url and base_url. \
                     Falling back to local mode."
                        .to_string(),
                );
            }
        },
        Some(other) => {
            warnings.push(format!(
                "[source] mode = \"{other}\" is not recognised. Expected \"local\" or \
                 \"remote\". Using default (local)."
            ));
        }
    }

    // -- Source: max_files --
    if let Some(files) = raw.source.max_files {
        if (1..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[source] max_files = {files} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => {
                warnings.push(format!(
                    "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \
                     \"light\". Using default (dark)."
                ));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info)."
            ));
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from_str(content: &str) -> (AppConfig, Vec<String>) {
        let raw: RawConfig = toml::from_str(content).unwrap();
        let mut warnings = Vec::new();
        let config = validate(raw, &mut warnings);
        (config, warnings)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert!(matches!(config.source_mode, SourceMode::Local { .. }));
        assert!(config.dark_mode);
    }

    #[test]
    fn test_remote_mode_requires_both_urls() {
        let (config, warnings) = load_from_str(
            r#"
            [source]
            mode = "remote"
            listing_url = "http://example.test/listing"
            "#,
        );
        assert!(matches!(config.source_mode, SourceMode::Local { .. }));
        assert_eq!(warnings.len(), 1);

        let (config, warnings) = load_from_str(
            r#"
            [source]
            mode = "remote"
            listing_url = "http://example.test/listing"
            base_url = "http://example.test/data/"
            "#,
        );
        assert!(warnings.is_empty());
        assert!(matches!(config.source_mode, SourceMode::Remote { .. }));
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let (config, warnings) = load_from_str(
            r#"
            [source]
            mode = "carrier-pigeon"
            max_files = 0

            [ui]
            theme = "plaid"

            [logging]
            level = "shout"
            "#,
        );
        assert_eq!(warnings.len(), 4);
        assert!(matches!(config.source_mode, SourceMode::Local { .. }));
        assert_eq!(config.max_files, constants::DEFAULT_MAX_FILES);
        assert!(config.dark_mode);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_, warnings) = load_from_str(
            r#"
            [source]
            mode = "local"
            root = "/var/logs"
            future_knob = true
            "#,
        );
        assert!(warnings.is_empty());
    }
}
