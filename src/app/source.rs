// LogVista - app/source.rs
//
// Source discovery and retrieval: turning "where the log files live"
// into a list of (filename, bytes) pairs for the core pipeline.
//
// Two modes:
//   - Local: recursive directory walk matching *.csv / *.xlsx
//     (walkdir + glob, with per-entry errors collected as warnings).
//   - Remote: fetch a JSON content listing (an array of objects with a
//     "name" field), filter to known extensions, then fetch each file
//     by base_url + name.
//
// The core pipeline is agnostic to the mode; it only ever sees names
// and byte buffers. Failures enumerating sources are fatal
// (DiscoveryError); failures reading an individual source are per-file
// IngestErrors the loader downgrades to warnings.

use crate::util::constants;
use crate::util::error::{DiscoveryError, IngestError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where source files come from.
#[derive(Debug, Clone)]
pub enum SourceMode {
    /// Recursively enumerate files under a local root directory.
    Local { root: PathBuf },

    /// Enumerate a remote content listing, then fetch files by URL.
    Remote {
        listing_url: String,
        base_url: String,
    },
}

impl SourceMode {
    /// Short human-readable description for the status bar.
    pub fn describe(&self) -> String {
        match self {
            Self::Local { root } => root.display().to_string(),
            Self::Remote { base_url, .. } => base_url.clone(),
        }
    }
}

/// A discovered source file, not yet read.
#[derive(Debug, Clone)]
pub enum SourceHandle {
    Local(PathBuf),
    Remote { name: String, url: String },
}

impl SourceHandle {
    /// The bare file name used for region classification and warnings.
    pub fn name(&self) -> String {
        match self {
            Self::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Remote { name, .. } => name.clone(),
        }
    }

    /// Read the source's bytes. Local reads enforce the per-file size
    /// bound before touching content; remote reads rely on the HTTP
    /// client's timeout.
    pub fn read(&self, client: Option<&reqwest::blocking::Client>) -> Result<Vec<u8>, IngestError> {
        let name = self.name();
        match self {
            Self::Local(path) => {
                let meta = std::fs::metadata(path).map_err(|e| IngestError::Io {
                    name: name.clone(),
                    source: e,
                })?;
                if meta.len() > constants::MAX_SOURCE_FILE_BYTES {
                    return Err(IngestError::TooLarge {
                        name,
                        size: meta.len(),
                        max: constants::MAX_SOURCE_FILE_BYTES,
                    });
                }
                std::fs::read(path).map_err(|e| IngestError::Io { name, source: e })
            }
            Self::Remote { url, .. } => {
                let client = client.expect("remote handles require an HTTP client");
                let response = client
                    .get(url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| IngestError::Fetch {
                        name: name.clone(),
                        source: e,
                    })?;
                let bytes = response.bytes().map_err(|e| IngestError::Fetch {
                    name: name.clone(),
                    source: e,
                })?;
                if bytes.len() as u64 > constants::MAX_SOURCE_FILE_BYTES {
                    return Err(IngestError::TooLarge {
                        name,
                        size: bytes.len() as u64,
                        max: constants::MAX_SOURCE_FILE_BYTES,
                    });
                }
                Ok(bytes.to_vec())
            }
        }
    }
}

/// Limits applied to a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth (local mode).
    pub max_depth: usize,

    /// Maximum number of source files returned before truncation.
    pub max_files: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
        }
    }
}

/// Build the blocking HTTP client used for remote mode.
pub fn http_client() -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
        .user_agent(format!(
            "{}/{}",
            constants::APP_NAME,
            constants::APP_VERSION
        ))
        .build()
}

/// Enumerate sources for the given mode.
///
/// Returns the handles plus non-fatal warnings (inaccessible entries,
/// truncation). Fails only when the source list itself cannot be
/// produced.
pub fn discover(
    mode: &SourceMode,
    config: &DiscoveryConfig,
    client: Option<&reqwest::blocking::Client>,
) -> Result<(Vec<SourceHandle>, Vec<String>), DiscoveryError> {
    match mode {
        SourceMode::Local { root } => discover_local(root, config),
        SourceMode::Remote {
            listing_url,
            base_url,
        } => {
            let client = client.expect("remote discovery requires an HTTP client");
            discover_remote(listing_url, base_url, config, client)
        }
    }
}

// =============================================================================
// Local discovery
// =============================================================================

fn discover_local(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<SourceHandle>, Vec<String>), DiscoveryError> {
    // fs::metadata rather than Path::exists()/is_dir(): those helpers
    // map ALL errors (including PermissionDenied) to false, making an
    // access-denied root indistinguishable from a missing one.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    let patterns = compile_patterns(constants::SOURCE_INCLUDE_PATTERNS);

    let mut handles = Vec::new();
    let mut warnings = Vec::new();
    let mut truncated = false;

    for entry_result in walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                // Inaccessible entry: non-fatal, record warning.
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.path().file_name().and_then(|n| n.to_str()) else {
            warnings.push(format!(
                "Skipping '{}': non-UTF-8 filename",
                entry.path().display()
            ));
            continue;
        };

        if !patterns.iter().any(|p| p.matches(file_name)) {
            continue;
        }

        if handles.len() >= max_files {
            truncated = true;
            break;
        }
        handles.push(SourceHandle::Local(entry.path().to_path_buf()));
    }

    if truncated {
        warnings.push(format!(
            "More source files were found than the ingest limit of {max_files}. \
             Only the first {max_files} have been loaded."
        ));
    }

    tracing::debug!(
        root = %root.display(),
        files = handles.len(),
        warnings = warnings.len(),
        "Local discovery complete"
    );
    Ok((handles, warnings))
}

/// Compile the include glob patterns; the table is a compile-time
/// constant, so failures are programmer errors caught by tests.
fn compile_patterns(patterns: &[&str]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

// =============================================================================
// Remote discovery
// =============================================================================

/// One entry of the remote content listing. Unknown fields are ignored;
/// entries without a name are skipped.
#[derive(Debug, Deserialize)]
struct ListingEntry {
    #[serde(default)]
    name: Option<String>,
}

fn discover_remote(
    listing_url: &str,
    base_url: &str,
    config: &DiscoveryConfig,
    client: &reqwest::blocking::Client,
) -> Result<(Vec<SourceHandle>, Vec<String>), DiscoveryError> {
    let body = client
        .get(listing_url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(|e| DiscoveryError::Listing {
            url: listing_url.to_string(),
            source: e,
        })?;

    let names = parse_listing(listing_url, &body)?;

    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let mut warnings = Vec::new();
    if names.len() > max_files {
        warnings.push(format!(
            "The remote listing contains {} files but the ingest limit is {max_files}. \
             Only the first {max_files} have been loaded.",
            names.len()
        ));
    }

    let base = base_url.trim_end_matches('/');
    let handles: Vec<SourceHandle> = names
        .into_iter()
        .take(max_files)
        .map(|name| SourceHandle::Remote {
            url: format!("{base}/{name}"),
            name,
        })
        .collect();

    tracing::debug!(
        listing = listing_url,
        files = handles.len(),
        "Remote discovery complete"
    );
    Ok((handles, warnings))
}

/// Decode a content listing body into the file names worth fetching.
/// Split out from the HTTP call so the decode logic is testable offline.
fn parse_listing(url: &str, body: &str) -> Result<Vec<String>, DiscoveryError> {
    let entries: Vec<ListingEntry> =
        serde_json::from_str(body).map_err(|e| DiscoveryError::ListingDecode {
            url: url.to_string(),
            source: e,
        })?;

    Ok(entries
        .into_iter()
        .filter_map(|e| e.name)
        .filter(|name| {
            let lower = name.to_lowercase();
            constants::SOURCE_EXTENSIONS
                .iter()
                .any(|ext| lower.ends_with(&format!(".{ext}")))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_temp_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        fs::write(root.join("NSK_errors.csv"), "Exception\nBoom\n").expect("write csv");
        fs::write(root.join("MUM_log.xlsx"), b"stub").expect("write xlsx");
        fs::write(root.join("readme.txt"), "not a log\n").expect("write txt");

        let sub = root.join("archive");
        fs::create_dir(&sub).expect("mkdir");
        fs::write(sub.join("BGLR_old.csv"), "Exception\n").expect("write nested csv");

        dir
    }

    #[test]
    fn test_local_discovery_matches_extensions() {
        let dir = make_temp_tree();
        let (handles, warnings) =
            discover_local(dir.path(), &DiscoveryConfig::default()).unwrap();

        let names: Vec<String> = handles.iter().map(|h| h.name()).collect();
        assert!(names.contains(&"NSK_errors.csv".to_string()));
        assert!(names.contains(&"MUM_log.xlsx".to_string()));
        assert!(names.contains(&"BGLR_old.csv".to_string()), "nested file");
        assert!(!names.contains(&"readme.txt".to_string()));
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_local_discovery_max_depth_1_excludes_subdirs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_depth: 1,
            ..Default::default()
        };
        let (handles, _) = discover_local(dir.path(), &config).unwrap();
        let names: Vec<String> = handles.iter().map(|h| h.name()).collect();
        assert!(!names.contains(&"BGLR_old.csv".to_string()));
    }

    #[test]
    fn test_local_discovery_truncates_with_warning() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_files: 1,
            ..Default::default()
        };
        let (handles, warnings) = discover_local(dir.path(), &config).unwrap();
        assert_eq!(handles.len(), 1);
        assert!(
            warnings.iter().any(|w| w.contains("limit")),
            "expected truncation warning, got {warnings:?}"
        );
    }

    #[test]
    fn test_local_discovery_root_not_found() {
        let result = discover_local(
            Path::new("/nonexistent/path/logvista"),
            &DiscoveryConfig::default(),
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_local_discovery_root_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir.csv");
        fs::write(&file, "content").unwrap();
        let result = discover_local(&file, &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_parse_listing_filters_extensions() {
        let body = r#"[
            {"name": "NSK_errors.xlsx", "size": 1234},
            {"name": "MUM_log.csv"},
            {"name": "README.md"},
            {"path": "no-name-field"},
            {"name": "BHO_report.XLSX"}
        ]"#;
        let names = parse_listing("http://example.test/listing", body).unwrap();
        assert_eq!(
            names,
            vec!["NSK_errors.xlsx", "MUM_log.csv", "BHO_report.XLSX"]
        );
    }

    #[test]
    fn test_parse_listing_decode_error() {
        let result = parse_listing("http://example.test/listing", "not json at all");
        assert!(matches!(
            result,
            Err(DiscoveryError::ListingDecode { .. })
        ));
    }

    #[test]
    fn test_include_patterns_compile() {
        assert_eq!(
            compile_patterns(constants::SOURCE_INCLUDE_PATTERNS).len(),
            constants::SOURCE_INCLUDE_PATTERNS.len()
        );
    }
}
