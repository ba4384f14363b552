//! Scheduler layer for the runner
//!
//! Turns the input files into jobs, drives every job through its lifecycle
//! and collects the outcomes into a run report.

pub mod lifecycle;
pub mod runner;

pub use lifecycle::{JobLifecycle, JobOutcome, JobReport};
pub use runner::{JobRunner, RunReport, select_repository};
