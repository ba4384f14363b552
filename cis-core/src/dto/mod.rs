//! Data Transfer Objects for the ClientIntegration API
//!
//! Response bodies use camelCase field names. Every field the runner does not
//! strictly need is defaulted so that older or newer servers still parse.

pub mod environment;
pub mod job;
pub(crate) mod nullable;
mod timestamp;

pub use timestamp::parse_timestamp;
