//! CIS Core
//!
//! Core types shared by the CIS client and the job runner.
//!
//! This crate contains:
//! - Domain types: repositories, jobs and their lifecycle, log entries
//! - DTOs: the JSON shapes exchanged with the ClientIntegration API

pub mod domain;
pub mod dto;
