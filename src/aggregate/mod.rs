//! Run-level aggregation: fan jobs out over the model×unit grid, collect
//! sealed results, summarize, and export.

pub mod export;
pub mod metrics;
pub mod run;

pub use export::{write_code_artifacts, write_csv};
pub use metrics::{BackendTally, ModelSummary, RunSummary};
pub use run::RunAggregator;
