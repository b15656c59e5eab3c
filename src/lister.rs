use std::path::Path;

use tracing::{debug, error};
use walkdir::WalkDir;

use crate::cleaner::Entry;
use crate::pattern::WildcardPattern;

/// List the immediate children of `dir` whose names match `pattern`.
///
/// Files and directories both count, nothing below the first level is visited.
/// An empty or absent pattern matches everything. Errors are logged and the
/// offending entry (or the rest of the directory) is skipped.
pub fn list_entries(dir: &Path, pattern: Option<&str>) -> Vec<Entry> {
    let matcher = match pattern.filter(|p| !p.is_empty()) {
        None => None,
        Some(raw) => match WildcardPattern::compile(raw) {
            Ok(m) => Some(m),
            Err(e) => {
                // Nothing can match a broken pattern.
                error!("Invalid wildcard pattern for {}: {e}", dir.display());
                return Vec::new();
            }
        },
    };

    let mut entries = Vec::new();

    for item in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                error!("Error accessing path {}: {e}", dir.display());
                continue;
            }
        };

        if let Some(m) = &matcher {
            let name = item.file_name().to_string_lossy();
            if !m.matches(&name) {
                continue;
            }
        }

        let modified = match item
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|m| m.modified())
        {
            Ok(t) => t,
            Err(e) => {
                error!("Error reading metadata for {}: {e}", item.path().display());
                continue;
            }
        };

        entries.push(Entry {
            path: item.path().to_path_buf(),
            modified,
            is_dir: item.file_type().is_dir(),
        });
    }

    debug!("Listed {} entries in {}", entries.len(), dir.display());
    entries
}
