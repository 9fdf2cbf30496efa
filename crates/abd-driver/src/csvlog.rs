//! Latency CSV log (supplemented from `ABDClient_async.cpp`'s `main`,
//! which times every PUT/GET and appends a row to a timestamped CSV file
//! under `logs/`).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

/// Appends `op,key,value,latency_ms,success` rows to a timestamped CSV
/// file under `logs/`.
pub struct LatencyLog {
    file: File,
}

impl LatencyLog {
    /// Creates `logs/<input_stem>-<DD-MM-YYYY_HH:MM:SS>.csv` and writes
    /// the header row, matching the original's filename convention.
    pub fn create(input_path: &Path) -> Result<Self> {
        Self::create_under("logs", input_path)
    }

    /// Same as [`LatencyLog::create`], but rooted at `logs_dir` instead
    /// of the conventional `logs/` (used by tests to avoid mutating the
    /// process's current directory).
    pub fn create_under(logs_dir: impl AsRef<Path>, input_path: &Path) -> Result<Self> {
        let logs_dir = logs_dir.as_ref();
        fs::create_dir_all(logs_dir)
            .with_context(|| format!("failed to create {}", logs_dir.display()))?;

        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workload".to_string());
        let timestamp = Local::now().format("%d-%m-%Y_%H:%M:%S");
        let csv_path: PathBuf = logs_dir.join(format!("{stem}-{timestamp}.csv"));

        let mut file = File::create(&csv_path)
            .with_context(|| format!("failed to create CSV log at {}", csv_path.display()))?;
        writeln!(file, "op,key,value,latency_ms,success")?;

        Ok(Self { file })
    }

    /// Appends one record.
    pub fn record(&mut self, op: &str, key: &str, value: &str, latency: Duration, success: bool) -> Result<()> {
        writeln!(
            self.file,
            "{op},{key},{value},{},{}",
            latency.as_millis(),
            i32::from(success)
        )
        .context("failed to append CSV log record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn creates_header_and_appends_rows() {
        let dir = tempdir().unwrap();
        let logs_dir = dir.path().join("logs");

        let mut log = LatencyLog::create_under(&logs_dir, Path::new("workload.txt")).unwrap();
        log.record("PUT", "k", "v", Duration::from_millis(12), true)
            .unwrap();
        log.record("GET", "k", "v", Duration::from_millis(3), false)
            .unwrap();
        drop(log);

        let entries: Vec<_> = fs::read_dir(&logs_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let contents = fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("op,key,value,latency_ms,success"));
        assert_eq!(lines.next(), Some("PUT,k,v,12,1"));
        assert_eq!(lines.next(), Some("GET,k,v,3,0"));
    }
}
