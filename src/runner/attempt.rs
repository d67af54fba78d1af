//! Attempt controller - runs one job to a terminal state.
//!
//! The controller walks Start → Generating → Verifying → Sealed for one
//! (model, source-unit) pair:
//! 1. Invoke the generator with the previous attempt's feedback (empty on
//!    the first attempt), retrying generation a small fixed number of times
//!    on failure (distinct from the verification retry ceiling).
//! 2. On generator exhaustion, seal GeneratorUnavailable.
//! 3. Otherwise run all three verification backends to completion - no
//!    short-circuit on an early failure, all three verdicts feed aggregation.
//! 4. Pass seals Succeeded; a non-pass verdict below the ceiling loops back
//!    with extracted feedback; at the ceiling it seals ExhaustedRetries.
//!
//! No transition is reversible; the attempt list only grows until sealing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::domain::{Attempt, AttemptVerdict, BackendReport, Job, JobKey, JobStatus, SourceUnit};
use crate::generate::{AnnotationGenerator, GenerationFailure};
use crate::verify::{VerificationBackend, combine, extract_feedback};

/// Retry ceilings for one job.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Verification retry ceiling (attempts per job).
    pub max_retries: u32,

    /// Additional generator calls allowed per attempt on generation failure.
    pub generator_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            generator_retries: 2,
        }
    }
}

/// Runs one job's attempt loop against an injected generator and backend set.
pub struct AttemptController<G>
where
    G: AnnotationGenerator + ?Sized,
{
    generator: Arc<G>,
    backends: Vec<Arc<dyn VerificationBackend>>,
    policy: RetryPolicy,
}

impl<G> AttemptController<G>
where
    G: AnnotationGenerator + ?Sized,
{
    /// Create a controller with the given dependencies.
    pub fn new(generator: Arc<G>, backends: Vec<Arc<dyn VerificationBackend>>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            backends,
            policy,
        }
    }

    /// Run the job to a terminal state.
    ///
    /// Returns `None` when the cancellation flag is raised before sealing;
    /// the unsealed job is not persisted and will be re-run on resume.
    pub async fn run(&self, key: JobKey, unit: &SourceUnit, cancel: &AtomicBool) -> Option<Job> {
        let start = Instant::now();
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut feedback = String::new();

        for ordinal in 1..=self.policy.max_retries {
            if cancel.load(Ordering::SeqCst) {
                log::info!("Cancellation raised, abandoning unsealed job {}", key);
                return None;
            }

            let attempt_start = Instant::now();

            let annotated = match self.generate_with_retry(unit, &feedback).await {
                Ok(code) => code,
                Err(failure) => {
                    // Generator exhausted its own small retry budget; seal
                    // without invoking any verification backend.
                    log::warn!("Generator unavailable for {}: {}", key, failure);
                    attempts.push(Attempt {
                        ordinal,
                        annotated_source: String::new(),
                        outcomes: Vec::new(),
                        verdict: combine(&[]),
                        feedback: failure.to_string(),
                        duration_ms: attempt_start.elapsed().as_millis() as u64,
                    });
                    return Some(Job::seal(
                        key,
                        attempts,
                        JobStatus::GeneratorUnavailable,
                        start.elapsed().as_millis() as u64,
                    ));
                }
            };

            let reports = self.verify_all(unit, &annotated).await;
            let verdict = combine(&reports);
            let next_feedback = extract_feedback(&reports);

            tracing::debug!(job = %key, ordinal, verdict = %verdict, "Attempt sealed");

            attempts.push(Attempt {
                ordinal,
                annotated_source: annotated,
                outcomes: reports,
                verdict,
                feedback: next_feedback.clone(),
                duration_ms: attempt_start.elapsed().as_millis() as u64,
            });

            match verdict {
                AttemptVerdict::Pass => {
                    return Some(Job::seal(
                        key,
                        attempts,
                        JobStatus::Succeeded,
                        start.elapsed().as_millis() as u64,
                    ));
                }
                _ if ordinal == self.policy.max_retries => {
                    return Some(Job::seal(
                        key,
                        attempts,
                        JobStatus::ExhaustedRetries,
                        start.elapsed().as_millis() as u64,
                    ));
                }
                _ => feedback = next_feedback,
            }
        }

        // max_retries >= 1 is enforced by config validation; the loop above
        // always seals before falling through.
        unreachable!("attempt loop must seal the job")
    }

    /// Invoke the generator, retrying transient failures up to the small
    /// generator-retry budget. The budget covers backend outages; failed
    /// verification never lands here.
    async fn generate_with_retry(&self, unit: &SourceUnit, feedback: &str) -> Result<String, GenerationFailure> {
        let mut last_failure = GenerationFailure::EmptyResponse;

        for call in 0..=self.policy.generator_retries {
            match self.generator.generate(unit, feedback).await {
                Ok(code) => return Ok(code),
                Err(failure) => {
                    log::warn!(
                        "Generation call {}/{} failed for {}: {}",
                        call + 1,
                        self.policy.generator_retries + 1,
                        unit.name,
                        failure
                    );
                    last_failure = failure;
                }
            }
        }

        Err(last_failure)
    }

    /// Run every backend to completion over its own isolated input.
    ///
    /// All backends always report; a missing verdict would corrupt the
    /// per-backend statistics even when another backend already failed.
    async fn verify_all(&self, unit: &SourceUnit, annotated: &str) -> Vec<BackendReport> {
        let class_name = unit.class_name();

        let futures = self
            .backends
            .iter()
            .map(|backend| async move { (backend.name().to_string(), backend.verify(class_name, annotated).await) });

        futures::future::join_all(futures)
            .await
            .into_iter()
            .map(|(name, outcome)| BackendReport::new(name, outcome))
            .collect()
    }
}
