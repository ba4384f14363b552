//! Per-job lifecycle
//!
//! Drives one job from submission to release:
//! submit → poll until the status is terminal → download on success →
//! release. Steps within a job are strictly sequential. Release happens
//! exactly once, after the terminal status is known, whatever the outcome.

use cis_core::domain::job::{Job, JobRequest, JobState, MetadataEntry, StatusClass};
use cis_core::dto::job::SubmissionFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::clock::Clock;
use crate::context::JobContext;
use crate::error::JobError;
use crate::gateway::JobGateway;

/// How a job that reached a terminal status ended
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Result downloaded to `file`
    Succeeded { job_id: Uuid, file: PathBuf },
    /// Terminal status other than success; nothing was downloaded
    Failed {
        job_id: Uuid,
        status: String,
        details: String,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }
}

/// Everything known about a job once its lifecycle is over
#[derive(Debug)]
pub struct JobReport {
    pub correlation_id: Uuid,
    pub files: Vec<PathBuf>,
    /// Remote identifier, if the submit went through
    pub job_id: Option<Uuid>,
    pub state: JobState,
    pub result: Result<JobOutcome, JobError>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_success())
    }
}

/// Drives jobs through their lifecycle against a gateway
pub struct JobLifecycle {
    gateway: Arc<dyn JobGateway>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    output_dir: PathBuf,
    file_metadata: Vec<MetadataEntry>,
}

impl JobLifecycle {
    /// Creates a lifecycle driver
    ///
    /// # Arguments
    /// * `gateway` - Remote API
    /// * `clock` - Time source for the polling delay
    /// * `poll_interval` - Delay before each status check
    /// * `output_dir` - Downloads go to `<output_dir>/<jobId>/`
    /// * `file_metadata` - Entries attached to every submitted file
    pub fn new(
        gateway: Arc<dyn JobGateway>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        output_dir: PathBuf,
        file_metadata: Vec<MetadataEntry>,
    ) -> Self {
        Self {
            gateway,
            clock,
            poll_interval,
            output_dir,
            file_metadata,
        }
    }

    /// Runs the whole lifecycle of one job. Never panics on remote or
    /// local failures; they end up in the report.
    pub async fn drive(&self, request: JobRequest, context: &JobContext) -> JobReport {
        let correlation_id = request.correlation_id();
        let files = request.files().to_vec();

        let mut job = match self.submit(request, context).await {
            Ok(job) => job,
            Err(e) => {
                context.log_error(e.to_string());
                return JobReport {
                    correlation_id,
                    files,
                    job_id: None,
                    state: JobState::Created,
                    result: Err(e),
                };
            }
        };

        let result = self.follow(&mut job, context).await;
        if let Err(e) = &result {
            context.log_error(e.to_string());
        }

        JobReport {
            correlation_id: job.correlation_id(),
            files,
            job_id: Some(job.job_id()),
            state: job.state().clone(),
            result,
        }
    }

    async fn submit(&self, request: JobRequest, context: &JobContext) -> Result<Job, JobError> {
        context.log_info(submit_message(request.files()));

        let submission: Vec<SubmissionFile> = request
            .files()
            .iter()
            .map(|path| SubmissionFile::new(path, self.file_metadata.clone()))
            .collect();

        let job_id = self
            .gateway
            .submit(request.repository_id(), &submission)
            .await
            .map_err(JobError::Submit)?;

        context.log_info(format!("Submitted. Job ID: {}\n", job_id));
        Ok(Job::submitted(request, job_id))
    }

    /// Everything after a successful submit
    async fn follow(&self, job: &mut Job, context: &JobContext) -> Result<JobOutcome, JobError> {
        let class = self.poll_until_terminal(job, context).await?;
        context.log_debug(format!(
            "Queue time: {}s, processing time: {}s",
            job.total_queue_time_in_sec, job.total_processing_time_in_sec
        ));

        let outcome = match class {
            StatusClass::Succeeded => {
                context.log_info(format!("Job {} completed successfully.\n", job.job_id()));
                self.download(job, context).await
            }
            _ => {
                context.log_error(format!(
                    "Job completed with status: {}. Details: {}",
                    job.status, job.details
                ));
                Ok(JobOutcome::Failed {
                    job_id: job.job_id(),
                    status: job.status.clone(),
                    details: job.details.clone(),
                })
            }
        };

        self.release(job, context).await;
        outcome
    }

    /// Waits, checks, repeats until the status carries the terminal prefix.
    /// There is no attempt limit.
    async fn poll_until_terminal(
        &self,
        job: &mut Job,
        context: &JobContext,
    ) -> Result<StatusClass, JobError> {
        let job_id = job.job_id();
        loop {
            self.clock.sleep(self.poll_interval).await;

            let status = self
                .gateway
                .get_status(job_id)
                .await
                .map_err(|source| JobError::Status { job_id, source })?;

            let class = job.observe(&status)?;
            context.log_info(format!("Status: {}. ID: {}", status.status, job_id));

            if class.is_terminal() {
                return Ok(class);
            }
        }
    }

    async fn download(&self, job: &mut Job, context: &JobContext) -> Result<JobOutcome, JobError> {
        let job_id = job.job_id();
        let location = self.output_dir.join(job_id.to_string());
        tokio::fs::create_dir_all(&location)
            .await
            .map_err(|source| JobError::OutputDir {
                path: location.clone(),
                source,
            })?;

        context.log_info(format!("Downloading files from Job: {}", job_id));
        let file = self
            .gateway
            .download(job_id, &location)
            .await
            .map_err(|source| JobError::Download { job_id, source })?;
        job.mark_downloaded()?;
        context.log_info(format!("Download complete. Location: {}\n", location.display()));

        Ok(JobOutcome::Succeeded { job_id, file })
    }

    /// Best effort: a failed release is logged and does not change the outcome
    async fn release(&self, job: &mut Job, context: &JobContext) {
        let job_id = job.job_id();
        context.log_info(format!("Releasing Job: {}", job_id));

        match self.gateway.release(job_id).await {
            Ok(()) => {
                if let Err(e) = job.mark_released() {
                    context.log_warning(e.to_string());
                }
                context.log_info("Job Released.\n");
            }
            Err(e) => context.log_warning(format!("Failed to release job {}: {}", job_id, e)),
        }
    }
}

fn submit_message(files: &[PathBuf]) -> String {
    match files {
        [single] => format!("Submitting file: {}...", display_name(single)),
        _ => format!(
            "Submitting {} files ({})",
            files.len(),
            files
                .iter()
                .map(|f| display_name(f))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
