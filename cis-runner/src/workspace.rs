//! On-disk layout of a run
//!
//! Everything lives under one root directory:
//! - `log.txt`: run log, truncated at start, receives fatal errors
//! - `JobLogs/`: one log file per job, cleared at start
//! - `Input/`: files to submit
//! - `Output/<jobId>/`: downloaded results

use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::error::RunError;

const RUN_LOG_FILE: &str = "log.txt";
const JOB_LOG_DIRECTORY: &str = "JobLogs";
const SHARED_JOB_LOG_FILE: &str = "joblog.txt";
const INPUT_DIRECTORY: &str = "Input";
const OUTPUT_DIRECTORY: &str = "Output";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.root.join(RUN_LOG_FILE)
    }

    pub fn job_log_dir(&self) -> PathBuf {
        self.root.join(JOB_LOG_DIRECTORY)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(INPUT_DIRECTORY)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIRECTORY)
    }

    /// Log file of a job. `None` selects the file shared by a combined job.
    pub fn job_log_path(&self, correlation_id: Option<Uuid>) -> PathBuf {
        match correlation_id {
            Some(id) => self.job_log_dir().join(format!("joblog_{}.txt", id)),
            None => self.job_log_dir().join(SHARED_JOB_LOG_FILE),
        }
    }

    /// Creates `Input/` and `JobLogs/`, and empties `JobLogs/`.
    ///
    /// Failing to clear old job logs is only a warning.
    pub fn prepare(&self) -> Result<(), RunError> {
        for dir in [self.input_dir(), self.job_log_dir()] {
            std::fs::create_dir_all(&dir).map_err(|source| RunError::Workspace {
                path: dir.clone(),
                source,
            })?;
        }

        if let Err(e) = clear_files(&self.job_log_dir()) {
            warn!("Error clearing {} directory: {}", JOB_LOG_DIRECTORY, e);
        }
        Ok(())
    }

    /// Regular files in `Input/`, sorted by name
    pub fn input_files(&self) -> Result<Vec<PathBuf>, RunError> {
        let dir = self.input_dir();
        let workspace_err = |source: io::Error| RunError::Workspace {
            path: dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(workspace_err)? {
            let entry = entry.map_err(workspace_err)?;
            if entry.file_type().map_err(workspace_err)?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

fn clear_files(dir: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
