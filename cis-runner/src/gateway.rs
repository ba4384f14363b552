//! Remote API gateway
//!
//! The runner talks to CIS only through [`JobGateway`]. The HTTP
//! implementation delegates to [`CisClient`]; tests plug in scripted
//! implementations to simulate status sequences and failures.

use async_trait::async_trait;
use cis_client::{CisClient, Result};
use cis_core::dto::environment::EnvironmentResponse;
use cis_core::dto::job::{JobStatusResponse, SubmissionFile};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;

/// The five remote operations the workflow depends on
#[async_trait]
pub trait JobGateway: Send + Sync {
    /// Fetches repositories and global variables for the API key
    async fn get_environment(&self) -> Result<EnvironmentResponse>;

    /// Submits files into a repository
    ///
    /// # Returns
    /// The job identifier assigned by the server
    async fn submit(&self, repository_id: Uuid, files: &[SubmissionFile]) -> Result<Uuid>;

    /// Fetches the current status of a job
    async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse>;

    /// Downloads the job result into `directory`
    ///
    /// # Returns
    /// Path of the written file
    async fn download(&self, job_id: Uuid, directory: &Path) -> Result<PathBuf>;

    /// Releases the job; its data is gone afterwards
    async fn release(&self, job_id: Uuid) -> Result<()>;
}

/// HTTP implementation of JobGateway
pub struct HttpJobGateway {
    client: CisClient,
}

impl HttpJobGateway {
    /// Creates a gateway from the runner configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = CisClient::new(
            config.base_url.clone(),
            &config.api_key_header,
            &config.api_key,
            config.trust_certs,
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JobGateway for HttpJobGateway {
    async fn get_environment(&self) -> Result<EnvironmentResponse> {
        self.client.get_environment().await
    }

    async fn submit(&self, repository_id: Uuid, files: &[SubmissionFile]) -> Result<Uuid> {
        self.client.submit(repository_id, files).await
    }

    async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse> {
        self.client.get_status(job_id).await
    }

    async fn download(&self, job_id: Uuid, directory: &Path) -> Result<PathBuf> {
        self.client.download(job_id, directory).await
    }

    async fn release(&self, job_id: Uuid) -> Result<()> {
        self.client.release(job_id).await
    }
}
