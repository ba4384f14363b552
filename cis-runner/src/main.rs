//! CIS Runner
//!
//! Sample client for the CIS client integration API.
//!
//! Architecture:
//! - Configuration: `appsettings.json`, bootstrapped with defaults when missing
//! - Workspace: run log, per-job logs, input and output directories
//! - Gateway: the remote API behind a trait, backed by `cis-client`
//! - Scheduler: per-job lifecycle and the fan-out runner
//! - Shutdown: the single fatal error path
//!
//! Every file in `Input/` is submitted to the first repository of the
//! environment, either as one job or as one job per file. Each job is polled
//! until it completes, its result is downloaded on success, and it is
//! released afterwards.

mod clock;
mod config;
mod console;
mod context;
mod error;
mod gateway;
mod run_log;
mod scheduler;
mod shutdown;
mod workspace;

#[cfg(test)]
mod testing;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::clock::{Clock, TokioClock};
use crate::config::{CONFIG_FILE, Config};
use crate::error::RunError;
use crate::gateway::{HttpJobGateway, JobGateway};
use crate::run_log::RunLog;
use crate::scheduler::{JobLifecycle, JobRunner, select_repository};
use crate::workspace::Workspace;

#[derive(Parser)]
#[command(name = "cis-runner")]
#[command(about = "Submit files to CIS and collect the results", long_about = None)]
struct Cli {
    /// Configuration file, relative to the root directory unless absolute
    #[arg(long, env = "CIS_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Directory holding log.txt, JobLogs/, Input/ and Output/
    #[arg(long, env = "CIS_ROOT", default_value = ".")]
    root: PathBuf,

    /// Do not wait for enter before starting and before closing
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cis_runner=info,cis_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let workspace = Workspace::new(&cli.root);
    let clock: Arc<dyn Clock> = Arc::new(TokioClock);

    let run_log = RunLog::new(workspace.run_log_path());
    if let Err(e) = run_log.reset() {
        warn!("Failed to reset {}: {}", run_log.path().display(), e);
    }

    let config = match Config::load_or_bootstrap(&cli.root.join(&cli.config)) {
        Ok(config) => config,
        Err(e) => return shutdown::handle_fatal(&RunError::from(e), &run_log, None, clock.as_ref()).await,
    };

    let connect = || -> Result<Arc<dyn JobGateway>, RunError> {
        let gateway: Arc<dyn JobGateway> = Arc::new(HttpJobGateway::from_config(&config)?);
        Ok(gateway)
    };
    match run(&config, workspace, connect, Arc::clone(&clock), !cli.yes).await {
        Ok(()) => {
            if !cli.yes {
                prompt("Press enter to close...").await;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            shutdown::handle_fatal(&e, &run_log, Some(config.error_close_seconds), clock.as_ref())
                .await
        }
    }
}

/// Everything between a loaded configuration and the final verdict.
///
/// `connect` is only called once the local preconditions hold, so nothing
/// reaches the server when they fail.
async fn run<F>(
    config: &Config,
    workspace: Workspace,
    connect: F,
    clock: Arc<dyn Clock>,
    interactive: bool,
) -> Result<(), RunError>
where
    F: FnOnce() -> Result<Arc<dyn JobGateway>, RunError>,
{
    workspace.prepare()?;
    let files = workspace.input_files()?;
    if files.is_empty() {
        return Err(RunError::NoInputFiles);
    }
    info!("Found {} input file(s)", files.len());

    console::print_settings(config);
    if interactive {
        prompt("Press enter to start...").await;
    }

    let gateway = connect()?;
    let repository = select_repository(gateway.as_ref()).await?;

    let lifecycle = JobLifecycle::new(
        gateway,
        clock,
        config.poll_interval(),
        workspace.output_dir(),
        config.file_metadata.clone(),
    );
    let runner = JobRunner::new(lifecycle, workspace);

    let report = runner
        .run(repository.id, files, config.separate_jobs)
        .await;
    console::print_report(&report);
    report.into_result()
}

/// A failed prompt only loses the pause
async fn prompt(message: &str) {
    if let Err(e) = console::wait_for_enter(message).await {
        warn!("{:#}", e);
    }
}
