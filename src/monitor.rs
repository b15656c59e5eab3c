use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::cleaner::{EvictionReport, Remover};
use crate::config::MonitorConfig;
use crate::lister;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot inspect {}: {source}", path.display())]
    Inspect { path: PathBuf, source: io::Error },
}

/// What happened to one watched directory during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    Missing,
    NotADirectory,
    WithinLimit { count: usize },
    Evicted(EvictionReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub visited: usize,
    pub skipped: usize,
    pub failed: usize,
    pub removed: usize,
}

/// Apply one directory's retention rule.
pub fn scan_path(
    config: &MonitorConfig,
    remover: &dyn Remover,
    now: SystemTime,
) -> Result<PathOutcome, ScanError> {
    let path = &config.path;
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        // A path running through a regular file is as absent as a missing one.
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            warn!("Path does not exist: {}", path.display());
            return Ok(PathOutcome::Missing);
        }
        Err(source) => {
            return Err(ScanError::Inspect {
                path: path.clone(),
                source,
            })
        }
    };
    if !meta.is_dir() {
        warn!("Path is not a directory: {}", path.display());
        return Ok(PathOutcome::NotADirectory);
    }

    info!("Scan path: {}", path.display());
    let entries = lister::list_entries(path, config.wildcard_pattern.as_deref());
    let policy = config.policy();
    if !policy.is_over_limit(entries.len()) {
        return Ok(PathOutcome::WithinLimit {
            count: entries.len(),
        });
    }

    info!(
        "Path {} has {} items (max: {}), checking for removal...",
        path.display(),
        entries.len(),
        config.max_files_count
    );
    let report = policy.evict(entries, remover, now);
    if report.removed > 0 {
        info!("Removed {} items from {}", report.removed, path.display());
    }
    Ok(PathOutcome::Evicted(report))
}

/// Visit every configured directory once, in order. A failure on one path never
/// prevents the others from being scanned.
pub fn scan_cycle(monitors: &[MonitorConfig], remover: &dyn Remover) -> CycleSummary {
    let now = SystemTime::now();
    let mut summary = CycleSummary::default();

    for config in monitors {
        summary.visited += 1;
        match scan_path(config, remover, now) {
            Ok(PathOutcome::Missing | PathOutcome::NotADirectory) => summary.skipped += 1,
            Ok(PathOutcome::WithinLimit { .. }) => {}
            Ok(PathOutcome::Evicted(report)) => summary.removed += report.removed,
            Err(e) => {
                summary.failed += 1;
                error!("Error scanning path {}: {e}", config.path.display());
            }
        }
    }

    summary
}
