//! Drives the model×unit grid to completion with bounded parallelism.
//!
//! The aggregator owns the full run: it loads already-sealed jobs from the
//! store, skips their keys, and schedules the rest as independent attempt
//! loops over a buffered stream. Sealed jobs are persisted the moment they
//! complete, so a crash or cancellation loses at most the jobs still in
//! flight. A persistence failure for one job is logged and the run carries
//! on; the job is simply re-run on the next resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use futures::stream;

use crate::domain::{JobKey, RunResult, SourceUnit};
use crate::error::Result;
use crate::generate::AnnotationGenerator;
use crate::runner::{AttemptController, RetryPolicy};
use crate::storage::JobStore;
use crate::verify::VerificationBackend;

/// Schedules attempt loops across every (model, source-unit) pair.
pub struct RunAggregator {
    generators: Vec<(String, Arc<dyn AnnotationGenerator>)>,
    backends: Vec<Arc<dyn VerificationBackend>>,
    policy: RetryPolicy,
    max_jobs: usize,
}

impl RunAggregator {
    /// Create an aggregator over named generators and a shared backend set.
    pub fn new(
        generators: Vec<(String, Arc<dyn AnnotationGenerator>)>,
        backends: Vec<Arc<dyn VerificationBackend>>,
        policy: RetryPolicy,
        max_jobs: usize,
    ) -> Self {
        Self {
            generators,
            backends,
            policy,
            max_jobs,
        }
    }

    /// Run every pending (model, unit) pair to a terminal state.
    ///
    /// Jobs already sealed in the store are skipped. Returns the combined
    /// result set: resumed records plus everything sealed during this call.
    pub async fn run(
        &self,
        units: &[SourceUnit],
        store: &mut JobStore,
        cancel: &Arc<AtomicBool>,
    ) -> Result<RunResult> {
        let mut result = store.load()?;
        let resumed = result.len();
        if resumed > 0 {
            log::info!("Resuming: {} sealed jobs loaded from {}", resumed, store.path().display());
        }

        let mut pending = Vec::new();
        for (model, generator) in &self.generators {
            for unit in units {
                let key = JobKey::new(model.clone(), unit.name.clone());
                if result.contains(&key) {
                    log::debug!("Skipping already-sealed job {}", key);
                    continue;
                }

                let controller =
                    AttemptController::new(Arc::clone(generator), self.backends.clone(), self.policy);
                let unit = unit.clone();
                let cancel = Arc::clone(cancel);
                pending.push(async move { controller.run(key, &unit, &cancel).await });
            }
        }

        let total = pending.len();
        log::info!(
            "Scheduling {} jobs ({} models x {} units, {} resumed) with up to {} in flight",
            total,
            self.generators.len(),
            units.len(),
            resumed,
            self.max_jobs
        );

        let mut sealed = 0usize;
        let mut abandoned = 0usize;
        let mut stream = stream::iter(pending).buffer_unordered(self.max_jobs.max(1));
        while let Some(outcome) = stream.next().await {
            match outcome {
                Some(job) => {
                    log::info!(
                        "Sealed {} as {} after {} attempt(s) in {}ms",
                        job.key,
                        job.status,
                        job.attempt_count(),
                        job.total_duration_ms
                    );
                    // Persist before counting; a failed append means the job
                    // reruns on resume, which is safe, so the run continues.
                    if let Err(err) = store.append(&job) {
                        log::error!("Failed to persist job {}: {}", job.key, err);
                    } else {
                        sealed += 1;
                    }
                    result.insert(job);
                }
                None => abandoned += 1,
            }
        }

        if cancel.load(Ordering::SeqCst) {
            log::warn!(
                "Run cancelled: {} of {} jobs sealed, {} abandoned unsealed",
                sealed,
                total,
                abandoned
            );
        } else {
            log::info!("Run complete: {} of {} jobs sealed", sealed, total);
        }

        Ok(result)
    }
}
