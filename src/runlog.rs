//
// runlog.rs
// bids-batch
//
// Per-run audit log. An explicit instance is created for each invocation and
// passed into the driver; nothing is attached to process-wide logging state.
//

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::models::RunSummary;

/// Append-only sink for job outcome records, backed by a file that is
/// truncated at the start of every run so stale context never accumulates
/// across invocations. Records are mirrored to `tracing` for the console.
pub struct RunLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RunLog {
    /// Create (truncating) the log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create run log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped record.
    pub fn record(&mut self, message: &str) -> Result<()> {
        tracing::info!("{message}");
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.writer, "{stamp}  {message}")
            .with_context(|| format!("Failed to write to run log {}", self.path.display()))?;
        self.writer.flush().context("Failed to flush run log")?;
        Ok(())
    }

    /// Append the final per-run summary counts.
    pub fn summary(&mut self, summary: &RunSummary) -> Result<()> {
        self.record(&format!(
            "Run finished: {} slots ({} executed, {} skipped, {} missing source, {} failed)",
            summary.total(),
            summary.executed,
            summary.skipped,
            summary.missing_source,
            summary.failed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn records_are_appended_with_timestamps() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dcm2bids.log");

        let mut log = RunLog::create(&path).expect("create log");
        log.record("Running dcm2bids for sub-1860B").expect("record");
        log.record("Subject sub-6472B already exists").expect("record");

        let contents = fs::read_to_string(&path).expect("read log");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Running dcm2bids for sub-1860B"));
        assert!(lines[1].ends_with("Subject sub-6472B already exists"));
    }

    #[test]
    fn reopening_truncates_the_previous_run() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dcm2bids.log");

        let mut log = RunLog::create(&path).expect("create log");
        log.record("first run").expect("record");
        drop(log);

        let mut log = RunLog::create(&path).expect("recreate log");
        log.record("second run").expect("record");
        drop(log);

        let contents = fs::read_to_string(&path).expect("read log");
        assert!(!contents.contains("first run"));
        assert!(contents.contains("second run"));
    }

    #[test]
    fn summary_reports_all_counts() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dcm2bids.log");

        let mut log = RunLog::create(&path).expect("create log");
        log.summary(&RunSummary {
            executed: 2,
            skipped: 1,
            missing_source: 1,
            failed: 0,
        })
        .expect("summary");

        let contents = fs::read_to_string(&path).expect("read log");
        assert!(contents.contains("4 slots"));
        assert!(contents.contains("2 executed"));
        assert!(contents.contains("1 missing source"));
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bids").join("dcm2bids.log");
        let mut log = RunLog::create(&path).expect("create log");
        log.record("hello").expect("record");
        assert!(path.exists());
    }
}
