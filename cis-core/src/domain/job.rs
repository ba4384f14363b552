//! Job domain types
//!
//! A job is created locally as a [`JobRequest`], becomes a [`Job`] once the
//! remote system assigns it an identifier, and is driven through
//! [`JobState`] purely by status observations fetched from the remote side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::dto::job::JobStatusResponse;

/// Prefix shared by every terminal status string
pub const TERMINAL_STATUS_PREFIX: &str = "Completed";

/// The only terminal status that counts as success
pub const SUCCESS_STATUS: &str = "CompletedSuccessful";

/// Classification of a raw status string returned by the remote system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Not terminal yet; keep polling
    Pending,
    /// Terminal and successful
    Succeeded,
    /// Terminal with any other value
    Failed,
}

impl StatusClass {
    /// Classifies a status string.
    ///
    /// Only the `"Completed"` prefix decides terminality, and only the exact
    /// value `"CompletedSuccessful"` is a success.
    pub fn of(status: &str) -> Self {
        if !status.starts_with(TERMINAL_STATUS_PREFIX) {
            StatusClass::Pending
        } else if status == SUCCESS_STATUS {
            StatusClass::Succeeded
        } else {
            StatusClass::Failed
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, StatusClass::Pending)
    }
}

/// A name/value pair attached to one input file at submit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Value")]
    pub value: String,
}

impl MetadataEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Lifecycle state of a job as seen by the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Created,
    Submitted,
    Polling,
    CompletedSuccessful,
    CompletedFailed { status: String, details: String },
    Downloaded,
    Released,
}

impl JobState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_advance_to(&self, next: &JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, Submitted)
                | (Submitted, Polling)
                | (Polling, Polling)
                | (Polling, CompletedSuccessful)
                | (Polling, CompletedFailed { .. })
                | (CompletedSuccessful, Downloaded)
                | (CompletedSuccessful, Released)
                | (CompletedFailed { .. }, Released)
                | (Downloaded, Released)
        )
    }

    fn name(&self) -> &'static str {
        match self {
            JobState::Created => "Created",
            JobState::Submitted => "Submitted",
            JobState::Polling => "Polling",
            JobState::CompletedSuccessful => "CompletedSuccessful",
            JobState::CompletedFailed { .. } => "CompletedFailed",
            JobState::Downloaded => "Downloaded",
            JobState::Released => "Released",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: JobState,
    pub to: JobState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid job transition {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// A unit of work that has not been submitted yet
///
/// The file list is non-empty and is fixed from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    correlation_id: Uuid,
    repository_id: Uuid,
    files: Vec<PathBuf>,
}

impl JobRequest {
    /// Creates a request with a fresh correlation id. Returns `None` for an
    /// empty file list.
    pub fn new(repository_id: Uuid, files: Vec<PathBuf>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        Some(Self {
            correlation_id: Uuid::new_v4(),
            repository_id,
            files,
        })
    }

    /// Runner-generated id used to attribute logs to this job
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn repository_id(&self) -> Uuid {
        self.repository_id
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// A submitted job tracked by its remote identifier
#[derive(Debug, Clone)]
pub struct Job {
    job_id: Uuid,
    correlation_id: Uuid,
    state: JobState,
    pub status: String,
    pub details: String,
    pub total_queue_time_in_sec: f64,
    pub total_processing_time_in_sec: f64,
}

impl Job {
    /// Binds the identifier assigned by the remote system to a request
    pub fn submitted(request: JobRequest, job_id: Uuid) -> Self {
        Self {
            job_id,
            correlation_id: request.correlation_id,
            state: JobState::Submitted,
            status: String::new(),
            details: String::new(),
            total_queue_time_in_sec: 0.0,
            total_processing_time_in_sec: 0.0,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Records a freshly fetched status and advances the state accordingly
    pub fn observe(&mut self, response: &JobStatusResponse) -> Result<StatusClass, InvalidTransition> {
        let class = StatusClass::of(&response.status);
        let next = match class {
            StatusClass::Pending => JobState::Polling,
            StatusClass::Succeeded => JobState::CompletedSuccessful,
            StatusClass::Failed => JobState::CompletedFailed {
                status: response.status.clone(),
                details: response.details.clone(),
            },
        };

        // A job is polled at least once before reaching a terminal state.
        if self.state == JobState::Submitted || next == JobState::Polling {
            self.advance(JobState::Polling)?;
        }
        if next != JobState::Polling {
            self.advance(next)?;
        }

        self.status = response.status.clone();
        self.details = response.details.clone();
        self.total_queue_time_in_sec = response.total_queue_time_in_sec;
        self.total_processing_time_in_sec = response.total_processing_time_in_sec;

        Ok(class)
    }

    pub fn mark_downloaded(&mut self) -> Result<(), InvalidTransition> {
        self.advance(JobState::Downloaded)
    }

    pub fn mark_released(&mut self) -> Result<(), InvalidTransition> {
        self.advance(JobState::Released)
    }

    fn advance(&mut self, next: JobState) -> Result<(), InvalidTransition> {
        if !self.state.can_advance_to(&next) {
            return Err(InvalidTransition {
                from: self.state.clone(),
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
