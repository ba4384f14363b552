//! Job DTOs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::job::{MetadataEntry, StatusClass};

/// Response of the Status endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    #[serde(default = "super::environment::default_success")]
    pub success: bool,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub job_id: Uuid,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub repository_id: Uuid,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "crate::dto::nullable::null_as_default")]
    pub details: String,
    #[serde(default)]
    pub total_queue_time_in_sec: f64,
    #[serde(default)]
    pub total_processing_time_in_sec: f64,
}

impl JobStatusResponse {
    pub fn class(&self) -> StatusClass {
        StatusClass::of(&self.status)
    }
}

/// One file of a submission, with the metadata entries sent alongside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    pub path: PathBuf,
    pub metadata: Vec<MetadataEntry>,
}

impl SubmissionFile {
    pub fn new(path: impl Into<PathBuf>, metadata: Vec<MetadataEntry>) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }
}
