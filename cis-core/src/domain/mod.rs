//! Core domain types
//!
//! The entities the runner reasons about. Wire shapes live in [`crate::dto`];
//! the types here carry the invariants (non-empty file lists, legal state
//! transitions) that the workflow relies on.

pub mod environment;
pub mod job;
pub mod log;
