//! Domain types for jmlbench
//!
//! This module contains all core domain types:
//! - `SourceUnit` and `ModelHandle` - the inputs of a benchmark run
//! - `Attempt` and its verification outcomes - one generate+verify cycle
//! - `Job` and `RunResult` - the per-pair history and the full result set

pub mod attempt;
pub mod job;
pub mod source_unit;

pub use attempt::{Attempt, AttemptVerdict, BackendReport, OutcomeStatus, VerificationOutcome};
pub use job::{Job, JobKey, JobStatus, RunResult};
pub use source_unit::{ModelHandle, SourceUnit, discover_source_units, extract_class_name};
