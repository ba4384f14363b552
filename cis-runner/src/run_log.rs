//! Durable run log (`log.txt`)

use cis_core::domain::log::{LogEntry, LogLevel};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Truncates the log at the start of a run
    pub fn reset(&self) -> io::Result<()> {
        std::fs::write(&self.path, "")
    }

    /// Appends one timestamped error line
    pub fn append_error(&self, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", LogEntry::now(LogLevel::Error, message))
    }
}
