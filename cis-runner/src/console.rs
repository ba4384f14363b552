//! Console output of the interactive session

use anyhow::{Context, Result};
use colored::*;
use std::io::BufRead;

use crate::config::Config;
use crate::scheduler::{JobOutcome, JobReport, RunReport};

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Print the settings the run will use
pub fn print_settings(config: &Config) {
    println!("{}", "SETTINGS".bold());
    println!("Url: {}", config.base_url.cyan());
    println!("Submit as Separate Jobs: {}", yes_no(config.separate_jobs));
    println!("Skip Cert Verification: {}", yes_no(config.trust_certs));
    println!("Polling Rate: {}s", config.polling_rate_seconds);
    println!();
}

/// Print `prompt` and block until a line is read from stdin
pub async fn wait_for_enter(prompt: &str) -> Result<()> {
    println!("{}", prompt);
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| ())
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read from stdin")
}

/// Print one line per job and the overall verdict
pub fn print_report(report: &RunReport) {
    println!();
    println!("{}", format!("Run finished: {} job(s)", report.total()).bold());
    for job in &report.jobs {
        let line = describe(job);
        let line = if job.succeeded() { line.green() } else { line.red() };
        println!("  {} {}", "▸".cyan(), line);
    }
    println!();

    if report.failed() == 0 {
        println!("{}", "Demo Completed Successfully.".green().bold());
    }
}

fn describe(job: &JobReport) -> String {
    let files = job
        .files
        .iter()
        .filter_map(|f| f.file_name())
        .map(|name| name.to_string_lossy())
        .collect::<Vec<_>>()
        .join(", ");
    let job_id = job
        .job_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "not submitted".to_string());

    let outcome = match &job.result {
        Ok(JobOutcome::Succeeded { file, .. }) => format!("downloaded {}", file.display()),
        Ok(JobOutcome::Failed {
            status, details, ..
        }) => format!("{} ({})", status, details),
        Err(e) => format!("error: {}", e),
    };

    format!("[{}] {} | job {} | {} | {}", job.correlation_id, files, job_id, job.state, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use cis_client::ClientError;
    use cis_core::domain::job::JobState;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_describe_success() {
        let job_id = Uuid::new_v4();
        let report = JobReport {
            correlation_id: Uuid::new_v4(),
            files: vec![PathBuf::from("Input/a.pdf"), PathBuf::from("Input/b.pdf")],
            job_id: Some(job_id),
            state: JobState::Released,
            result: Ok(JobOutcome::Succeeded {
                job_id,
                file: PathBuf::from("Output/x/result.zip"),
            }),
        };

        let line = describe(&report);
        assert!(line.contains("a.pdf, b.pdf"));
        assert!(line.contains(&format!("job {}", job_id)));
        assert!(line.contains("Released"));
        assert!(line.ends_with("downloaded Output/x/result.zip"));
    }

    #[test]
    fn test_describe_unsubmitted() {
        let report = JobReport {
            correlation_id: Uuid::new_v4(),
            files: vec![PathBuf::from("Input/a.pdf")],
            job_id: None,
            state: JobState::Created,
            result: Err(JobError::Submit(ClientError::api_error(400, "bad request"))),
        };

        let line = describe(&report);
        assert!(line.contains("job not submitted"));
        assert!(line.contains("error: Submit failed"));
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(yes_no(false), "No");
    }
}
