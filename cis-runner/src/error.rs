//! Runner error types
//!
//! [`JobError`] stays inside a job; [`RunError`] ends the run. Whether a
//! fatal error deserves the on-screen countdown is decided here, the exit
//! itself happens in [`crate::shutdown`].

use cis_client::ClientError;
use cis_core::domain::job::InvalidTransition;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;

/// A failure that ends a single job's lifecycle early
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Submit failed: {0}")]
    Submit(#[source] ClientError),

    #[error("Status check for job {job_id} failed: {source}")]
    Status {
        job_id: Uuid,
        #[source]
        source: ClientError,
    },

    #[error("Could not create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download of job {job_id} failed: {source}")]
    Download {
        job_id: Uuid,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("Job task aborted: {0}")]
    Aborted(String),
}

/// A failure that ends the whole run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to prepare {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No files in Input folder to submit. Exiting.")]
    NoInputFiles,

    #[error("No repositories available.")]
    NoRepositories,

    #[error("API error: {0}")]
    Api(#[from] ClientError),

    #[error("Error: {0}")]
    Job(#[from] JobError),

    #[error("Job {job_id} completed with status: {status}. Details: {details}")]
    JobFailed {
        job_id: Uuid,
        status: String,
        details: String,
    },

    #[error("{failed} of {total} jobs did not complete successfully")]
    PartialFailure { failed: usize, total: usize },
}

impl RunError {
    /// Configuration problems abort before any interactive session starts,
    /// so they exit immediately. Everything else gets the countdown.
    pub fn countdown_applies(&self) -> bool {
        !matches!(self, RunError::Config(_))
    }
}
