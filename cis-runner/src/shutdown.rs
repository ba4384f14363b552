//! Fatal error path
//!
//! Runs once, from `main`, for any error that ends the run: the message is
//! shown, appended to the run log, left on screen for the configured number
//! of seconds, and the process exits with a failure status.

use colored::*;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing::warn;

use crate::clock::Clock;
use crate::error::RunError;
use crate::run_log::RunLog;

/// Reports a fatal error and returns the exit code for it
///
/// # Arguments
/// * `error` - The error ending the run
/// * `run_log` - Durable log receiving the message
/// * `error_close_seconds` - Countdown length, `None` when no config was loaded
/// * `clock` - Time source for the countdown
pub async fn handle_fatal(
    error: &RunError,
    run_log: &RunLog,
    error_close_seconds: Option<u64>,
    clock: &dyn Clock,
) -> ExitCode {
    let message = error.to_string();
    eprintln!("{}", message.red());

    if let Err(e) = run_log.append_error(&message) {
        warn!("Failed to write {}: {}", run_log.path().display(), e);
    }

    if let (true, Some(seconds)) = (error.countdown_applies(), error_close_seconds) {
        let mut stdout = io::stdout();
        if let Err(e) = countdown(seconds, clock, &mut stdout).await {
            warn!("Countdown interrupted: {}", e);
        }
    }

    ExitCode::FAILURE
}

/// Rewrites one line from `seconds` down to 0, one second apart
pub async fn countdown<W: Write>(seconds: u64, clock: &dyn Clock, out: &mut W) -> io::Result<()> {
    for remaining in (0..=seconds).rev() {
        write!(out, "\rClosing in {} seconds...", remaining)?;
        out.flush()?;
        if remaining != 0 {
            clock.sleep(Duration::from_secs(1)).await;
        }
    }
    writeln!(out)
}
