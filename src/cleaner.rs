use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::{error, info};

use crate::utils;

/// One child of a watched directory, as seen by the current scan.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub modified: SystemTime,
    /// A real directory, not a symlink to one.
    pub is_dir: bool,
}

/// How entries chosen for eviction actually leave the filesystem.
pub trait Remover {
    fn remove(&self, entry: &Entry) -> io::Result<()>;

    /// Whether removals really happen. Only affects log wording.
    fn is_live(&self) -> bool {
        true
    }
}

/// Deletes files, and directories recursively. Symlinks are unlinked, never followed.
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove(&self, entry: &Entry) -> io::Result<()> {
        utils::safe_remove(&entry.path, entry.is_dir)
    }
}

/// Reports what would be removed and leaves the filesystem untouched.
pub struct DryRunRemover;

impl Remover for DryRunRemover {
    fn remove(&self, _entry: &Entry) -> io::Result<()> {
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    pub max_files_count: u64,
    pub min_file_age_hours: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub listed: usize,
    pub removed: usize,
    pub failed: usize,
    /// The walk ended on an entry that was too young, not because the target was met.
    pub stopped_on_young: bool,
}

impl EvictionPolicy {
    pub fn is_over_limit(&self, count: usize) -> bool {
        count as u64 > self.max_files_count
    }

    /// Remove the oldest entries until at most `max_files_count` remain.
    ///
    /// The walk goes oldest first and ends at the first entry that is not older
    /// than `min_file_age_hours`. A failed removal is logged and skipped; it does
    /// not count towards the target.
    pub fn evict(
        &self,
        mut entries: Vec<Entry>,
        remover: &dyn Remover,
        now: SystemTime,
    ) -> EvictionReport {
        // Stable, so equal mtimes keep listing order.
        entries.sort_by_key(|e| e.modified);

        let mut report = EvictionReport {
            listed: entries.len(),
            ..Default::default()
        };

        for entry in &entries {
            let remaining = (report.listed - report.removed) as u64;
            if remaining <= self.max_files_count {
                break;
            }

            let age = utils::age_in_hours(entry.modified, now);
            if age <= self.min_file_age_hours {
                report.stopped_on_young = true;
                break;
            }

            let kind = if entry.is_dir { "directory" } else { "file" };
            match remover.remove(entry) {
                Ok(()) => {
                    report.removed += 1;
                    if remover.is_live() {
                        info!("Removed {kind}: {}", entry.path.display());
                    } else {
                        info!("Would remove {kind}: {} (age {age}h)", entry.path.display());
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Error removing {}: {e}", entry.path.display());
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    const HOUR: u64 = 3600;

    fn now() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 * HOUR)
    }

    fn entry(name: &str, age_hours: u64) -> Entry {
        Entry {
            path: PathBuf::from(name),
            modified: now() - Duration::from_secs(age_hours * HOUR),
            is_dir: false,
        }
    }

    /// Records every removal attempt, failing for the named paths.
    #[derive(Default)]
    struct Recorder {
        attempts: RefCell<Vec<String>>,
        fail_on: Vec<&'static str>,
    }

    impl Remover for Recorder {
        fn remove(&self, entry: &Entry) -> io::Result<()> {
            let name = entry.path.display().to_string();
            self.attempts.borrow_mut().push(name.clone());
            if self.fail_on.iter().any(|f| *f == name) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            Ok(())
        }
    }

    fn policy(max_files_count: u64, min_file_age_hours: u64) -> EvictionPolicy {
        EvictionPolicy {
            max_files_count,
            min_file_age_hours,
        }
    }

    #[test]
    fn removes_oldest_until_target() {
        let entries = vec![
            entry("c", 30),
            entry("a", 50),
            entry("e", 10),
            entry("b", 40),
            entry("d", 20),
        ];
        let recorder = Recorder::default();
        let report = policy(2, 0).evict(entries, &recorder, now());

        assert_eq!(report.removed, 3);
        assert_eq!(report.failed, 0);
        assert!(!report.stopped_on_young);
        assert_eq!(*recorder.attempts.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn stops_at_first_young_entry() {
        let entries = vec![entry("young", 5), entry("mid", 50), entry("old", 200)];
        let recorder = Recorder::default();
        let report = policy(0, 30).evict(entries, &recorder, now());

        assert_eq!(report.removed, 2);
        assert!(report.stopped_on_young);
        assert_eq!(*recorder.attempts.borrow(), vec!["old", "mid"]);
    }

    #[test]
    fn age_must_exceed_threshold() {
        // exactly 30 whole hours is not older than 30
        let entries = vec![entry("edge", 30), entry("older", 31)];
        let recorder = Recorder::default();
        let report = policy(0, 30).evict(entries, &recorder, now());

        assert_eq!(report.removed, 1);
        assert_eq!(*recorder.attempts.borrow(), vec!["older"]);
    }

    #[test]
    fn removes_min_of_eligible_and_excess() {
        // 6 entries, max 1, 3 eligible by age
        let entries = vec![
            entry("e1", 100),
            entry("e2", 90),
            entry("e3", 80),
            entry("y1", 2),
            entry("y2", 1),
            entry("y3", 0),
        ];
        let report = policy(1, 24).evict(entries, &Recorder::default(), now());
        assert_eq!(report.removed, 3);

        // 6 entries, max 4, all eligible
        let entries = (0..6).map(|i| entry(&format!("f{i}"), 100 + i)).collect();
        let report = policy(4, 24).evict(entries, &Recorder::default(), now());
        assert_eq!(report.removed, 2);
    }

    #[test]
    fn failed_removal_does_not_stop_the_walk() {
        let entries = vec![entry("first", 300), entry("second", 200), entry("third", 100)];
        let recorder = Recorder {
            fail_on: vec!["second"],
            ..Default::default()
        };
        let report = policy(0, 0).evict(entries, &recorder, now());

        assert_eq!(report.removed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(*recorder.attempts.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failed_removal_leaves_target_unmet_count_intact() {
        // max 2 of 4: the failed entry still occupies a slot, so a third attempt is made
        let entries = vec![entry("a", 40), entry("b", 30), entry("c", 20), entry("d", 10)];
        let recorder = Recorder {
            fail_on: vec!["a"],
            ..Default::default()
        };
        let report = policy(2, 0).evict(entries, &recorder, now());

        assert_eq!(report.removed, 2);
        assert_eq!(*recorder.attempts.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn ties_keep_listing_order() {
        let entries = vec![entry("x", 10), entry("y", 10), entry("z", 10)];
        let recorder = Recorder::default();
        policy(1, 0).evict(entries, &recorder, now());
        assert_eq!(*recorder.attempts.borrow(), vec!["x", "y"]);
    }

    #[test]
    fn future_mtime_is_never_eligible() {
        let mut future = entry("future", 0);
        future.modified = now() + Duration::from_secs(5 * HOUR);
        let report = policy(0, 0).evict(vec![future], &Recorder::default(), now());
        assert_eq!(report.removed, 0);
        assert!(report.stopped_on_young);
    }

    #[test]
    fn over_limit_is_strict() {
        assert!(!policy(3, 0).is_over_limit(3));
        assert!(policy(3, 0).is_over_limit(4));
        assert!(policy(0, 0).is_over_limit(1));
        assert!(!policy(0, 0).is_over_limit(0));
    }
}
