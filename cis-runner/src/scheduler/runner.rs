//! Job runner
//!
//! Splits the input files into jobs and runs them. With fan-out every file
//! becomes its own job on its own task, logging to its own file; the run
//! only ends once every job has an outcome.

use cis_core::domain::environment::Repository;
use cis_core::domain::job::{JobRequest, JobState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::context::JobContext;
use crate::error::{JobError, RunError};
use crate::gateway::JobGateway;
use crate::scheduler::lifecycle::{JobLifecycle, JobOutcome, JobReport};
use crate::workspace::Workspace;

/// How input files are grouped into jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// One job carrying every file
    Combined,
    /// One job per file, run concurrently
    Separate,
}

impl SubmissionMode {
    /// Fan-out only makes sense with more than one file
    pub fn select(separate_jobs: bool, file_count: usize) -> Self {
        if separate_jobs && file_count > 1 {
            SubmissionMode::Separate
        } else {
            SubmissionMode::Combined
        }
    }
}

/// Builds the job requests for a run. No files, no jobs.
pub fn plan(repository_id: Uuid, files: Vec<PathBuf>, mode: SubmissionMode) -> Vec<JobRequest> {
    match mode {
        SubmissionMode::Separate => files
            .into_iter()
            .filter_map(|file| JobRequest::new(repository_id, vec![file]))
            .collect(),
        SubmissionMode::Combined => JobRequest::new(repository_id, files).into_iter().collect(),
    }
}

/// Picks the repository jobs are submitted into: the first one listed by
/// the environment.
pub async fn select_repository(gateway: &dyn JobGateway) -> Result<Repository, RunError> {
    let environment = gateway.get_environment().await?;
    if !environment.success {
        warn!("Environment request reported a problem: {}", environment.message);
    }
    for variable in &environment.global_variables {
        debug!("Global variable: {} = {}", variable.key, variable.value);
    }

    let repository = environment
        .target_repository()
        .cloned()
        .ok_or(RunError::NoRepositories)?;
    info!("Using repository: {} (ID: {})", repository.name, repository.id);
    Ok(repository)
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct RunReport {
    pub mode: SubmissionMode,
    pub jobs: Vec<JobReport>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// Jobs that did not end with a downloaded result
    pub fn failed(&self) -> usize {
        self.jobs.iter().filter(|job| !job.succeeded()).count()
    }

    /// Collapses the report into the run verdict.
    ///
    /// Fan-out with any failed job is a partial failure. A combined job
    /// surfaces its own error or failure status.
    pub fn into_result(self) -> Result<(), RunError> {
        match self.mode {
            SubmissionMode::Separate => {
                let failed = self.failed();
                if failed == 0 {
                    Ok(())
                } else {
                    Err(RunError::PartialFailure {
                        failed,
                        total: self.total(),
                    })
                }
            }
            SubmissionMode::Combined => {
                let report = self.jobs.into_iter().next().ok_or(RunError::NoInputFiles)?;
                match report.result? {
                    JobOutcome::Succeeded { .. } => Ok(()),
                    JobOutcome::Failed {
                        job_id,
                        status,
                        details,
                    } => Err(RunError::JobFailed {
                        job_id,
                        status,
                        details,
                    }),
                }
            }
        }
    }
}

/// Runs every job of a run to completion
pub struct JobRunner {
    lifecycle: Arc<JobLifecycle>,
    workspace: Workspace,
}

impl JobRunner {
    pub fn new(lifecycle: JobLifecycle, workspace: Workspace) -> Self {
        Self {
            lifecycle: Arc::new(lifecycle),
            workspace,
        }
    }

    /// Submits `files` into the repository and waits for every job.
    ///
    /// Job failures never abort the run; they are part of the report.
    pub async fn run(&self, repository_id: Uuid, files: Vec<PathBuf>, separate_jobs: bool) -> RunReport {
        let mode = SubmissionMode::select(separate_jobs, files.len());
        let requests = plan(repository_id, files, mode);

        let jobs = match mode {
            SubmissionMode::Separate => {
                info!("Submitting as multiple jobs.");
                self.run_separate(requests).await
            }
            SubmissionMode::Combined => {
                info!("Submitting as same job.");
                self.run_combined(requests).await
            }
        };

        RunReport { mode, jobs }
    }

    async fn run_combined(&self, requests: Vec<JobRequest>) -> Vec<JobReport> {
        let mut reports = Vec::with_capacity(requests.len());
        for request in requests {
            let context = JobContext::new(request.correlation_id(), self.workspace.job_log_path(None));
            reports.push(self.lifecycle.drive(request, &context).await);
        }
        reports
    }

    async fn run_separate(&self, requests: Vec<JobRequest>) -> Vec<JobReport> {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let correlation_id = request.correlation_id();
                let files = request.files().to_vec();
                let lifecycle = Arc::clone(&self.lifecycle);
                let log_path = self.workspace.job_log_path(Some(correlation_id));

                let handle = tokio::spawn(async move {
                    let context = JobContext::new(correlation_id, log_path);
                    lifecycle.drive(request, &context).await
                });
                (correlation_id, files, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (correlation_id, files, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(job = %correlation_id, "Job task panicked: {}", e);
                    reports.push(JobReport {
                        correlation_id,
                        files,
                        job_id: None,
                        state: JobState::Created,
                        result: Err(JobError::Aborted(e.to_string())),
                    });
                }
            }
        }
        reports
    }
}
