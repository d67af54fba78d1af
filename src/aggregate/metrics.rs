//! Pure aggregation over a sealed result set.
//!
//! Inconclusive is its own column everywhere; it is never folded into pass
//! or fail, so tool flakiness stays visible instead of skewing the rates.

use std::collections::BTreeMap;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::domain::{JobStatus, OutcomeStatus, RunResult};

/// Per-backend verdict tally across every attempt in the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendTally {
    pub pass: u64,
    pub fail: u64,
    pub inconclusive: u64,
}

impl BackendTally {
    fn record(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Pass => self.pass += 1,
            OutcomeStatus::Fail => self.fail += 1,
            OutcomeStatus::Inconclusive => self.inconclusive += 1,
        }
    }

    /// Total attempts this backend judged.
    pub fn total(&self) -> u64 {
        self.pass + self.fail + self.inconclusive
    }
}

/// Per-model rollup of job outcomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub jobs: u64,
    pub succeeded: u64,
    pub exhausted_retries: u64,
    pub generator_unavailable: u64,
    pub total_attempts: u64,
    pub total_duration_ms: u64,
}

impl ModelSummary {
    /// Fraction of jobs that sealed Succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.jobs == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.jobs as f64
    }

    /// Mean attempts per job.
    pub fn avg_attempts(&self) -> f64 {
        if self.jobs == 0 {
            return 0.0;
        }
        self.total_attempts as f64 / self.jobs as f64
    }
}

/// Everything the report view needs, computed once from a result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub models: BTreeMap<String, ModelSummary>,
    pub backends: BTreeMap<String, BackendTally>,
    pub total_jobs: u64,
}

impl RunSummary {
    /// Aggregate a sealed result set.
    pub fn from_result(result: &RunResult) -> Self {
        let mut summary = Self::default();

        for job in result.jobs() {
            summary.total_jobs += 1;

            let model = summary.models.entry(job.key.model.clone()).or_default();
            model.jobs += 1;
            model.total_attempts += job.attempt_count() as u64;
            model.total_duration_ms += job.total_duration_ms;
            match job.status {
                JobStatus::Succeeded => model.succeeded += 1,
                JobStatus::ExhaustedRetries => model.exhausted_retries += 1,
                JobStatus::GeneratorUnavailable => model.generator_unavailable += 1,
            }

            for attempt in &job.attempts {
                for report in &attempt.outcomes {
                    summary
                        .backends
                        .entry(report.backend.clone())
                        .or_default()
                        .record(report.outcome.status);
                }
            }
        }

        summary
    }

    /// Render the summary as a terminal report.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("{}\n", "Run Summary".bold()));
        out.push_str(&format!("  Total jobs: {}\n\n", self.total_jobs));

        out.push_str(&format!("{}\n", "Per model:".bold()));
        for (name, model) in &self.models {
            let rate = format!("{:.0}%", model.success_rate() * 100.0);
            let rate = if model.succeeded == model.jobs && model.jobs > 0 {
                rate.green().to_string()
            } else if model.succeeded == 0 {
                rate.red().to_string()
            } else {
                rate.yellow().to_string()
            };
            out.push_str(&format!(
                "  {}: {}/{} succeeded ({}), {} exhausted, {} unavailable, {:.1} avg attempts\n",
                name.as_str().cyan(),
                model.succeeded,
                model.jobs,
                rate,
                model.exhausted_retries,
                model.generator_unavailable,
                model.avg_attempts()
            ));
        }

        out.push_str(&format!("\n{}\n", "Per backend:".bold()));
        for (name, tally) in &self.backends {
            out.push_str(&format!(
                "  {}: {} pass / {} fail / {} inconclusive ({} attempts)\n",
                name.as_str().cyan(),
                tally.pass.to_string().green(),
                tally.fail.to_string().red(),
                tally.inconclusive.to_string().yellow(),
                tally.total()
            ));
        }

        out
    }
}
