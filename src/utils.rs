use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Remove a file, symlink or directory tree.
///
/// `is_dir` must come from metadata that did not follow symlinks, so a link to
/// a directory is unlinked rather than emptied.
pub fn safe_remove(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Whole hours elapsed since `modified`, rounded down. Timestamps in the future count as zero.
pub fn age_in_hours(modified: SystemTime, now: SystemTime) -> u64 {
    now.duration_since(modified)
        .map(|d| d.as_secs() / 3600)
        .unwrap_or(0)
}

/// Expand a leading `~` to the home directory. Other paths pass through unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn age_truncates_to_whole_hours() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(100 * 3600);
        assert_eq!(age_in_hours(now - Duration::from_secs(3599), now), 0);
        assert_eq!(age_in_hours(now - Duration::from_secs(3600), now), 1);
        assert_eq!(age_in_hours(now - Duration::from_secs(7 * 3600 + 59), now), 7);
        assert_eq!(age_in_hours(now + Duration::from_secs(3600), now), 0);
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home("/var/log"), PathBuf::from("/var/log"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
        assert_eq!(expand_home("~user/dir"), PathBuf::from("~user/dir"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/Downloads"), home.join("Downloads"));
        }
    }

    #[test]
    fn safe_remove_handles_files_and_trees() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let tree = tmp.path().join("tree");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/b.txt"), "y").unwrap();

        safe_remove(&file, false).unwrap();
        safe_remove(&tree, true).unwrap();

        assert!(!file.exists());
        assert!(!tree.exists());
        assert_eq!(
            safe_remove(&file, false).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
