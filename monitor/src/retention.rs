//! Retention sweep for daily metrics files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::error::Result;
use crate::store::parse_daily_file_name;

/// Delete `metrics-YYYY-MM-DD.json` files dated before `today - retention_days`
///
/// A file dated exactly on the cutoff day is kept. Names that do not match the
/// daily pattern are never touched. A missing directory sweeps nothing.
pub fn sweep(dir: &Path, retention_days: u32, today: NaiveDate) -> Result<Vec<PathBuf>> {
    let cutoff = today - Duration::days(i64::from(retention_days));

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(parse_daily_file_name) else {
            continue;
        };

        if date >= cutoff {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(file = %path.display(), "Cleaned up old metrics file");
                removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %path.display(), error = %e, "Failed to remove old metrics file"),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::daily_file_name;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "[]").unwrap();
    }

    #[test]
    fn test_sweep_respects_cutoff() {
        let temp = TempDir::new().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        for days_ago in [0, 1, 29, 30, 31, 45] {
            touch(temp.path(), &daily_file_name(today - Duration::days(days_ago)));
        }

        let removed = sweep(temp.path(), 30, today).unwrap();
        assert_eq!(removed.len(), 2);

        for days_ago in [0, 1, 29, 30] {
            assert!(temp.path().join(daily_file_name(today - Duration::days(days_ago))).exists());
        }
        for days_ago in [31, 45] {
            assert!(!temp.path().join(daily_file_name(today - Duration::days(days_ago))).exists());
        }
    }

    #[test]
    fn test_sweep_ignores_other_files() {
        let temp = TempDir::new().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        for name in [
            "alerts.json",
            "realtime-metrics.json",
            "dashboard-report.json",
            "metrics-old.json",
            "metrics-2001-01-01.json.bak",
        ] {
            touch(temp.path(), name);
        }

        let removed = sweep(temp.path(), 1, today).unwrap();
        assert!(removed.is_empty());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 5);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        touch(temp.path(), &daily_file_name(today - Duration::days(90)));

        assert_eq!(sweep(temp.path(), 30, today).unwrap().len(), 1);
        assert!(sweep(temp.path(), 30, today).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert!(sweep(&missing, 30, today).unwrap().is_empty());
    }
}
