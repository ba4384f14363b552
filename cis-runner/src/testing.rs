//! Test doubles for the gateway and the clock

use async_trait::async_trait;
use cis_client::{ClientError, Result};
use cis_core::domain::environment::Repository;
use cis_core::dto::environment::EnvironmentResponse;
use cis_core::dto::job::{JobStatusResponse, SubmissionFile};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::clock::Clock;
use crate::gateway::JobGateway;

/// Clock that returns immediately and remembers every requested delay
#[derive(Default)]
pub struct InstantClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// How the scripted server treats the job containing a given file
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Statuses returned in order; the last one repeats
    pub statuses: Vec<String>,
    pub details: String,
    pub fail_submit: bool,
    pub fail_status: bool,
    pub fail_download: bool,
    pub fail_release: bool,
}

impl Script {
    pub fn statuses(statuses: &[&str]) -> Self {
        Self {
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = details.to_string();
        self
    }
}

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Environment,
    Submit { files: Vec<SubmissionFile> },
    Status(Uuid),
    Download(Uuid),
    Release(Uuid),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    jobs: HashMap<Uuid, (Script, usize)>,
}

/// In-memory gateway driven by per-file scripts
///
/// A job follows the script registered for the file name of its first file.
pub struct ScriptedGateway {
    repositories: Vec<Repository>,
    scripts: HashMap<String, Script>,
    state: Mutex<State>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            repositories: vec![Repository {
                id: Uuid::new_v4(),
                name: "Inbound".to_string(),
                r#type: "Standard".to_string(),
                workspace_id: Uuid::new_v4(),
                workspace_name: "Default".to_string(),
            }],
            scripts: HashMap::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn without_repositories(mut self) -> Self {
        self.repositories.clear();
        self
    }

    pub fn script(mut self, file_name: &str, script: Script) -> Self {
        self.scripts.insert(file_name.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn submits(&self) -> Vec<Vec<SubmissionFile>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Submit { files } => Some(files),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matcher(call)).count()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn script_of(&self, job_id: Uuid) -> Script {
        self.state.lock().unwrap().jobs[&job_id].0.clone()
    }
}

fn scripted_failure(status: u16) -> ClientError {
    ClientError::api_error(status, "scripted failure")
}

#[async_trait]
impl JobGateway for ScriptedGateway {
    async fn get_environment(&self) -> Result<EnvironmentResponse> {
        self.record(Call::Environment);
        Ok(EnvironmentResponse {
            success: true,
            message: String::new(),
            repositories: self.repositories.clone(),
            global_variables: vec![],
            last_changed: None,
        })
    }

    async fn submit(&self, _repository_id: Uuid, files: &[SubmissionFile]) -> Result<Uuid> {
        self.record(Call::Submit {
            files: files.to_vec(),
        });
        tokio::task::yield_now().await;

        let key = files[0]
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script = self.scripts.get(&key).cloned().unwrap_or_default();
        if script.fail_submit {
            return Err(scripted_failure(400));
        }

        let job_id = Uuid::new_v4();
        self.state.lock().unwrap().jobs.insert(job_id, (script, 0));
        Ok(job_id)
    }

    async fn get_status(&self, job_id: Uuid) -> Result<JobStatusResponse> {
        self.record(Call::Status(job_id));
        tokio::task::yield_now().await;

        let status = {
            let mut state = self.state.lock().unwrap();
            let (script, cursor) = state.jobs.get_mut(&job_id).unwrap();
            if script.fail_status {
                return Err(scripted_failure(500));
            }
            let index = (*cursor).min(script.statuses.len().saturating_sub(1));
            *cursor += 1;
            script
                .statuses
                .get(index)
                .cloned()
                .unwrap_or_else(|| "CompletedSuccessful".to_string())
        };

        Ok(JobStatusResponse {
            job_id,
            status,
            details: self.script_of(job_id).details,
            ..Default::default()
        })
    }

    async fn download(&self, job_id: Uuid, directory: &Path) -> Result<PathBuf> {
        self.record(Call::Download(job_id));
        if self.script_of(job_id).fail_download {
            return Err(scripted_failure(500));
        }
        let path = directory.join(format!("{}.zip", job_id));
        std::fs::write(&path, b"result").map_err(|source| ClientError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    async fn release(&self, job_id: Uuid) -> Result<()> {
        self.record(Call::Release(job_id));
        if self.script_of(job_id).fail_release {
            return Err(scripted_failure(500));
        }
        Ok(())
    }
}
