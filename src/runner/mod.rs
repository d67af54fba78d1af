//! Attempt orchestration - one job's generate→verify→retry loop.

pub mod attempt;

pub use attempt::{AttemptController, RetryPolicy};
