//! Crash-safe persistence for sealed jobs.

pub mod jsonl;

pub use jsonl::JobStore;
