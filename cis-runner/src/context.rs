//! Per-job logging context
//!
//! Every job owns one context: progress goes to the console through
//! `tracing`, tagged with the job's correlation id, and is appended to the
//! job's own log file. Jobs never share a file, so concurrent jobs do not
//! contend. The file is opened once, when the context is created.

use cis_core::domain::log::{LogEntry, LogLevel};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct JobContext {
    correlation_id: Uuid,
    log_path: PathBuf,
    /// `None` when the log file could not be opened; lines then only reach
    /// the console
    log_file: Option<Mutex<File>>,
}

impl JobContext {
    /// Creates a context appending to `log_path`
    pub fn new(correlation_id: Uuid, log_path: PathBuf) -> Self {
        let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Some(Mutex::new(file)),
            Err(e) => {
                warn!(job = %correlation_id, "Failed to open {}: {}", log_path.display(), e);
                None
            }
        };

        Self {
            correlation_id,
            log_path,
            log_file,
        }
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn log_debug(&self, message: impl Into<String>) {
        self.add_log(LogEntry::now(LogLevel::Debug, message));
    }

    pub fn log_info(&self, message: impl Into<String>) {
        self.add_log(LogEntry::now(LogLevel::Info, message));
    }

    pub fn log_warning(&self, message: impl Into<String>) {
        self.add_log(LogEntry::now(LogLevel::Warning, message));
    }

    pub fn log_error(&self, message: impl Into<String>) {
        self.add_log(LogEntry::now(LogLevel::Error, message));
    }

    fn add_log(&self, entry: LogEntry) {
        let job = self.correlation_id;
        let message = entry.message.trim_end();
        match entry.level {
            LogLevel::Debug => debug!(%job, "{}", message),
            LogLevel::Info => info!(%job, "{}", message),
            LogLevel::Warning => warn!(%job, "{}", message),
            LogLevel::Error => error!(%job, "{}", message),
        }

        if let Err(e) = self.append_to_file(&entry) {
            warn!(%job, "Failed to write {}: {}", self.log_path.display(), e);
        }
    }

    fn append_to_file(&self, entry: &LogEntry) -> std::io::Result<()> {
        let Some(file) = &self.log_file else {
            return Ok(());
        };
        let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{}", entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_appended_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let context = JobContext::new(Uuid::new_v4(), dir.path().join("joblog.txt"));

        context.log_info("Submitted. Job ID: 1\n");
        context.log_error("Job completed with status: CompletedFailed");

        let text = std::fs::read_to_string(context.log_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] Submitted. Job ID: 1"));
        assert!(lines[1].contains("[ERROR] Job completed"));
    }

    #[test]
    fn test_contexts_append_to_shared_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joblog.txt");
        std::fs::write(&path, "earlier line\n").unwrap();

        let first = JobContext::new(Uuid::new_v4(), path.clone());
        first.log_info("first");
        drop(first);
        let second = JobContext::new(Uuid::new_v4(), path.clone());
        second.log_info("second");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "earlier line");
        assert!(lines[2].ends_with("[INFO] second"));
    }

    #[test]
    fn test_unwritable_sink_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let context = JobContext::new(Uuid::new_v4(), dir.path().join("missing/joblog.txt"));

        context.log_warning("still on the console");
        assert!(!context.log_path().exists());
    }
}
