//! Job-related API endpoints

use crate::CisClient;
use crate::disposition::filename_from_disposition;
use crate::error::{ClientError, Result};
use cis_core::dto::job::{JobStatusResponse, SubmissionFile};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, Response};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

impl CisClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit files as a new job
    ///
    /// Each file is streamed from disk as `InputFiles[i].InputFile`, followed
    /// by its metadata entries as `InputFiles[i].FileMetadata[j].Name/Value`.
    /// File handles live inside the multipart body and are closed once the
    /// request finishes, whatever its outcome.
    ///
    /// # Returns
    /// The job identifier assigned by the server
    pub async fn submit(&self, repository_id: Uuid, files: &[SubmissionFile]) -> Result<Uuid> {
        if files.is_empty() {
            return Err(ClientError::InvalidRequest(
                "A submission needs at least one file".to_string(),
            ));
        }

        let mut form = Form::new().text("RepositoryId", repository_id.to_string());

        for (i, file) in files.iter().enumerate() {
            form = form.part(format!("InputFiles[{}].InputFile", i), file_part(&file.path).await?);

            for (j, entry) in file.metadata.iter().enumerate() {
                form = form
                    .text(
                        format!("InputFiles[{}].FileMetadata[{}].Name", i, j),
                        entry.name.clone(),
                    )
                    .text(
                        format!("InputFiles[{}].FileMetadata[{}].Value", i, j),
                        entry.value.clone(),
                    );
            }
        }

        debug!("Submitting {} file(s) to repository {}", files.len(), repository_id);
        let response = self.request(Method::POST, "Submit").multipart(form).send().await?;

        self.handle_response(response).await
    }

    /// Get the status of a submitted job
    pub async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse> {
        let response = self
            .request(Method::GET, &format!("Status/{}", job_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Download the result of a completed job into `directory`
    ///
    /// The file name comes from the `Content-Disposition` header, falling back
    /// to `<jobId>.unknown`. The body is streamed to disk chunk by chunk.
    ///
    /// # Returns
    /// Path of the written file
    pub async fn download(&self, job_id: Uuid, directory: &Path) -> Result<PathBuf> {
        let response = self
            .request(Method::GET, &format!("Download/{}", job_id))
            .send()
            .await?;
        let mut response = self.ensure_success(response).await?;

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("{}.unknown", job_id));
        let path = directory.join(file_name);

        let file = File::create(&path)
            .await
            .map_err(|e| ClientError::io(&path, e))?;

        if let Err(e) = write_body(&mut response, file, &path).await {
            // No partial file is left behind
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove partial download {}: {}", path.display(), remove_err);
            }
            return Err(e);
        }

        debug!("Downloaded job {} result to {}", job_id, path.display());
        Ok(path)
    }

    /// Release the job. Once released, job data is no longer available.
    pub async fn release(&self, job_id: Uuid) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("Release/{}", job_id))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

/// Streams the response body into `file`, which is closed on return
async fn write_body(response: &mut Response, mut file: File, path: &Path) -> Result<()> {
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| ClientError::io(path, e))?;
    }
    file.flush().await.map_err(|e| ClientError::io(path, e))
}

/// Opens a file as a streamed octet-stream multipart part
async fn file_part(path: &Path) -> Result<Part> {
    let file = File::open(path)
        .await
        .map_err(|e| ClientError::io(path, e))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ClientError::io(path, e))?
        .len();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let part = Part::stream_with_length(Body::from(file), length)
        .file_name(file_name)
        .mime_str("application/octet-stream")?;
    Ok(part)
}
