//! JSON file persistence for samples, alerts and reports
//!
//! Every write is a full read-modify-write of a pretty-printed JSON document.
//! Only one monitor instance writes to a directory at a time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::alerts::Alert;
use crate::error::{StorageError, StorageResult};
use crate::metrics::MetricSample;
use crate::report::DashboardReport;

pub const DAILY_FILE_PREFIX: &str = "metrics-";
pub const DAILY_FILE_SUFFIX: &str = ".json";
pub const REALTIME_FILE: &str = "realtime-metrics.json";
pub const ALERTS_FILE: &str = "alerts.json";
pub const REPORT_FILE: &str = "dashboard-report.json";

/// Name of the daily metrics file for `date`
pub fn daily_file_name(date: NaiveDate) -> String {
    format!("{}{}{}", DAILY_FILE_PREFIX, date.format("%Y-%m-%d"), DAILY_FILE_SUFFIX)
}

/// Date embedded in a daily metrics file name, if the name matches exactly
pub fn parse_daily_file_name(name: &str) -> Option<NaiveDate> {
    let date = name
        .strip_prefix(DAILY_FILE_PREFIX)?
        .strip_suffix(DAILY_FILE_SUFFIX)?;
    if date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// File-backed store rooted at the monitoring directory
#[derive(Debug, Clone)]
pub struct MetricsStore {
    dir: PathBuf,
    alerts_dir: PathBuf,
    max_alerts: usize,
}

impl MetricsStore {
    pub fn new(dir: impl Into<PathBuf>, alerts_dir: impl Into<PathBuf>, max_alerts: usize) -> Self {
        Self {
            dir: dir.into(),
            alerts_dir: alerts_dir.into(),
            max_alerts,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the monitoring directory and its sibling alerts directory
    pub fn ensure_dirs(&self) -> StorageResult<()> {
        for dir in [&self.dir, &self.alerts_dir] {
            fs::create_dir_all(dir).map_err(|_| StorageError::DirectoryCreationFailed {
                path: dir.display().to_string(),
            })?;
        }
        debug!(dir = %self.dir.display(), "Monitoring directories ready");
        Ok(())
    }

    pub fn daily_file(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(daily_file_name(date))
    }

    pub fn realtime_file(&self) -> PathBuf {
        self.dir.join(REALTIME_FILE)
    }

    pub fn alerts_file(&self) -> PathBuf {
        self.dir.join(ALERTS_FILE)
    }

    pub fn report_file(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    /// Append to the day's file and replace the realtime snapshot
    ///
    /// Returns the daily file written.
    pub fn persist_sample(&self, sample: &MetricSample) -> StorageResult<PathBuf> {
        let path = self.daily_file(sample.timestamp.date_naive());

        let mut samples: Vec<serde_json::Value> = read_json_array(&path)?;
        samples.push(to_value(&path, sample)?);
        write_json(&path, &samples)?;

        write_json(&self.realtime_file(), sample)?;

        info!(file = %path.display(), "Metrics stored");
        Ok(path)
    }

    /// Daily samples for `date`
    pub fn load_samples(&self, date: NaiveDate) -> StorageResult<Vec<MetricSample>> {
        read_json_array(&self.daily_file(date))
    }

    /// Append alerts to `alerts.json`, keeping only the newest `max_alerts`
    pub fn append_alerts(&self, alerts: &[Alert]) -> StorageResult<()> {
        if alerts.is_empty() {
            return Ok(());
        }

        let path = self.alerts_file();
        let mut stored: Vec<Alert> = read_json_array(&path)?;
        stored.extend_from_slice(alerts);

        if stored.len() > self.max_alerts {
            let excess = stored.len() - self.max_alerts;
            stored.drain(..excess);
        }

        write_json(&path, &stored)
    }

    pub fn load_alerts(&self) -> StorageResult<Vec<Alert>> {
        read_json_array(&self.alerts_file())
    }

    pub fn write_report(&self, report: &DashboardReport) -> StorageResult<PathBuf> {
        let path = self.report_file();
        write_json(&path, report)?;
        Ok(path)
    }
}

/// Missing file reads as an empty array
fn read_json_array<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StorageError::CorruptedFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    serde_json::from_str(&content).map_err(|e| StorageError::CorruptedFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn to_value<T: Serialize>(path: &Path, value: &T) -> StorageResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| StorageError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let content = serde_json::to_string_pretty(value).map_err(|e| StorageError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    fs::write(path, content).map_err(|e| StorageError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
