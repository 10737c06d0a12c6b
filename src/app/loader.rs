// LogVista - app/loader.rs
//
// Load orchestration: discover sources, parse each one, stamp regions,
// concatenate into the resident LogTable, and derive synthetic columns.
//
// Error policy:
//   - Discovery failures are fatal (there is no source list).
//   - Per-source read/parse failures are non-fatal: recorded as
//     warnings, the source is skipped, the load continues.
//   - Zero successfully parsed sources is the single fatal data
//     condition (LoadError::NoData).
//
// The whole pipeline runs synchronously on the caller's thread; the
// result is cached for the lifetime of the process (see TableCache).

use crate::app::source::{self, DiscoveryConfig, SourceMode};
use crate::core::model::{LogTable, LoadSummary, SourceSummary};
use crate::core::{derive, ingest, region};
use crate::util::constants;
use crate::util::error::LoadError;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Everything a completed load produces: the resident table, the
/// observable summary, and accumulated non-fatal warnings.
#[derive(Debug)]
pub struct LoadOutcome {
    pub table: Arc<LogTable>,
    pub summary: LoadSummary,
    pub warnings: Vec<String>,
}

/// Run the full load pipeline once.
pub fn load(mode: &SourceMode, config: &DiscoveryConfig) -> Result<LoadOutcome, LoadError> {
    let started = Instant::now();

    let client = match mode {
        SourceMode::Remote { listing_url, .. } => Some(
            source::http_client().map_err(|e| {
                LoadError::Discovery(crate::util::error::DiscoveryError::Listing {
                    url: listing_url.clone(),
                    source: e,
                })
            })?,
        ),
        SourceMode::Local { .. } => None,
    };

    let (handles, mut warnings) = source::discover(mode, config, client.as_ref())?;
    let files_discovered = handles.len();

    let mut table = LogTable::default();
    let mut source_summaries = Vec::new();

    for handle in &handles {
        if table.rows.len() >= constants::MAX_TOTAL_ROWS {
            push_warning(
                &mut warnings,
                format!(
                    "Row limit of {} reached; remaining source files were skipped.",
                    constants::MAX_TOTAL_ROWS
                ),
            );
            break;
        }

        let name = handle.name();
        let parsed = handle
            .read(client.as_ref())
            .and_then(|bytes| ingest::parse_source(&name, &bytes));
        let mut parsed = match parsed {
            Ok(p) => p,
            Err(e) => {
                // Non-fatal: skip this source, keep the rest.
                tracing::warn!(source = %name, error = %e, "Source skipped");
                push_warning(&mut warnings, format!("Error reading {name}: {e}"));
                continue;
            }
        };

        // Every row from this source carries the region its filename
        // classifies to, overriding any Region column in the content.
        let file_region = region::classify(&name);
        for row in &mut parsed.rows {
            row.region = file_region;
        }

        tracing::info!(
            source = %name,
            rows = parsed.rows.len(),
            region = %file_region,
            "Source loaded"
        );

        source_summaries.push(SourceSummary {
            name,
            region: file_region,
            rows: parsed.rows.len(),
        });
        table.merge_columns(&parsed.columns);
        table.rows.append(&mut parsed.rows);
    }

    if source_summaries.is_empty() {
        tracing::error!(
            sources = files_discovered,
            "No data could be loaded from any source"
        );
        return Err(LoadError::NoData {
            sources_attempted: files_discovered,
        });
    }

    derive::derive(&mut table);

    let summary = LoadSummary {
        files_discovered,
        files_loaded: source_summaries.len(),
        total_rows: table.rows.len(),
        source_summaries,
        duration: started.elapsed(),
    };

    tracing::info!(
        files = summary.files_loaded,
        rows = summary.total_rows,
        elapsed_ms = summary.duration.as_millis() as u64,
        "Load complete"
    );

    Ok(LoadOutcome {
        table: Arc::new(table),
        summary,
        warnings,
    })
}

fn push_warning(warnings: &mut Vec<String>, message: String) {
    if warnings.len() < constants::MAX_WARNINGS {
        warnings.push(message);
    }
}

// =============================================================================
// Memoized singleton cache
// =============================================================================

/// Process-lifetime cache for the load result.
///
/// The load takes no parameters beyond the configured source mode, so
/// the cache is a memoized singleton: the first `get_or_load` runs the
/// pipeline, subsequent calls return the same Arc until `invalidate`
/// (the Reload action) or process exit.
#[derive(Debug, Default)]
pub struct TableCache {
    slot: Mutex<Option<Arc<LoadOutcome>>>,
}

impl TableCache {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached outcome, running the load on first call.
    /// A failed load caches nothing, so a later call retries.
    pub fn get_or_load(
        &self,
        mode: &SourceMode,
        config: &DiscoveryConfig,
    ) -> Result<Arc<LoadOutcome>, LoadError> {
        let mut slot = self.slot.lock().expect("table cache poisoned");
        if let Some(cached) = slot.as_ref() {
            tracing::debug!("Returning cached table");
            return Ok(Arc::clone(cached));
        }
        let outcome = Arc::new(load(mode, config)?);
        *slot = Some(Arc::clone(&outcome));
        Ok(outcome)
    }

    /// Drop the cached table so the next `get_or_load` re-runs the
    /// pipeline.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("table cache poisoned");
        if slot.take().is_some() {
            tracing::info!("Table cache invalidated");
        }
    }
}

/// The process-wide cache instance.
pub static TABLE_CACHE: TableCache = TableCache::new();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::region::Region;
    use std::fs;

    fn local_mode(dir: &tempfile::TempDir) -> SourceMode {
        SourceMode::Local {
            root: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn test_load_concatenates_and_stamps_regions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("NSK_errors.csv"),
            "Datetime,Exception\n\
             2024-06-01 10:00:00,NullReferenceException\n\
             2024-06-01 11:00:00,NullReferenceException\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("MUM_log.csv"),
            "Datetime,Exception,Object Name\n\
             2024-06-01 09:00:00,TimeoutException,JobRunner\n\
             2024-06-01 09:30:00,TimeoutException,JobRunner\n\
             2024-06-01 10:00:00,TimeoutException,Scheduler\n",
        )
        .unwrap();

        let outcome = load(&local_mode(&dir), &DiscoveryConfig::default()).unwrap();
        let table = &outcome.table;

        assert_eq!(table.rows.len(), 5);
        assert_eq!(outcome.summary.files_loaded, 2);
        assert_eq!(outcome.summary.total_rows, 5);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

        // Column union across files, with derived columns appended.
        assert!(table.has_column("Object Name"));
        assert!(table.has_column("Region"));
        assert!(table.has_column("Hour"));

        // Region completeness: every row mapped or Unknown, never null.
        let nashik = table
            .rows
            .iter()
            .filter(|r| r.region == Region::Nashik)
            .count();
        let mumbai = table
            .rows
            .iter()
            .filter(|r| r.region == Region::Mumbai)
            .count();
        assert_eq!((nashik, mumbai), (2, 3));

        // Derive ran: timestamps coerced, hours bucketed.
        assert!(table.rows.iter().all(|r| r.datetime.is_some()));
    }

    /// A corrupt source is skipped with a warning; the load still
    /// succeeds on the remaining files.
    #[test]
    fn test_load_skips_bad_source_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("MUM_log.csv"), "Exception\nTimeout\n").unwrap();
        fs::write(dir.path().join("BHO_bad.xlsx"), b"definitely not a zip").unwrap();

        let outcome = load(&local_mode(&dir), &DiscoveryConfig::default()).unwrap();
        assert_eq!(outcome.summary.files_loaded, 1);
        assert_eq!(outcome.summary.files_discovered, 2);
        assert_eq!(outcome.table.rows.len(), 1);
        assert!(
            outcome.warnings.iter().any(|w| w.contains("BHO_bad.xlsx")),
            "warning should name the bad source: {:?}",
            outcome.warnings
        );
    }

    /// Zero parseable sources is the single fatal data condition.
    #[test]
    fn test_load_no_data_when_every_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("DEL_bad.xlsx"), b"garbage").unwrap();

        let err = load(&local_mode(&dir), &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoData { sources_attempted: 1 }));
    }

    #[test]
    fn test_load_no_data_when_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&local_mode(&dir), &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoData { sources_attempted: 0 }));
    }

    #[test]
    fn test_load_discovery_error_is_fatal() {
        let mode = SourceMode::Local {
            root: std::path::PathBuf::from("/nonexistent/logvista-test"),
        };
        let err = load(&mode, &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::Discovery(_)));
    }

    /// The cache memoizes the first successful load and forgets it on
    /// invalidate.
    #[test]
    fn test_table_cache_memoizes_and_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("KOL_log.csv"), "Exception\nBoom\n").unwrap();

        let cache = TableCache::new();
        let mode = local_mode(&dir);
        let config = DiscoveryConfig::default();

        let first = cache.get_or_load(&mode, &config).unwrap();

        // Change the data on disk; the cache must keep serving the old table.
        fs::write(
            dir.path().join("KOL_log.csv"),
            "Exception\nBoom\nBang\n",
        )
        .unwrap();
        let second = cache.get_or_load(&mode, &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.table.rows.len(), 1);

        // After invalidate the pipeline re-runs and sees the new row.
        cache.invalidate();
        let third = cache.get_or_load(&mode, &config).unwrap();
        assert_eq!(third.table.rows.len(), 2);
    }

    /// A failed load is not cached; fixing the data and retrying works.
    #[test]
    fn test_table_cache_does_not_cache_failures() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new();
        let mode = local_mode(&dir);
        let config = DiscoveryConfig::default();

        assert!(cache.get_or_load(&mode, &config).is_err());

        fs::write(dir.path().join("CHN_log.csv"), "Exception\nBoom\n").unwrap();
        let outcome = cache.get_or_load(&mode, &config).unwrap();
        assert_eq!(outcome.table.rows.len(), 1);
    }
}
