//! Jobs and the run result set.
//!
//! A job is the unit of work for one (model, source-unit) pair: an ordered
//! attempt history plus a terminal status. Jobs are sealed exactly once and
//! immutable afterwards; the run result holds at most one job per key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::attempt::{Attempt, AttemptVerdict};

/// Key identifying one (model, source-unit) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    /// Model identifier.
    pub model: String,

    /// Source-unit name.
    pub unit: String,
}

impl JobKey {
    /// Create a key for a (model, unit) pair.
    pub fn new(model: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            unit: unit.into(),
        }
    }

    /// Stable record id for persistence, derived from the key fields.
    ///
    /// Hashes the fields with a separator byte so ("ab","c") and ("a","bc")
    /// cannot collide.
    pub fn record_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.model.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.unit.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.model, self.unit)
    }
}

/// Terminal status of a sealed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The last attempt's verdict was Pass.
    Succeeded,
    /// The retry ceiling was reached without a passing attempt.
    ExhaustedRetries,
    /// The generator could not produce a candidate despite its own retries.
    GeneratorUnavailable,
}

impl JobStatus {
    /// Human-readable name for the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Succeeded => "succeeded",
            JobStatus::ExhaustedRetries => "exhausted_retries",
            JobStatus::GeneratorUnavailable => "generator_unavailable",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full attempt history and terminal outcome for one (model, unit) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Stable record id, derived from the key.
    pub id: String,

    /// The (model, unit) key.
    pub key: JobKey,

    /// Chronologically ordered attempts (insertion order).
    pub attempts: Vec<Attempt>,

    /// Terminal status.
    pub status: JobStatus,

    /// Total wall-clock time for the job in milliseconds.
    pub total_duration_ms: u64,

    /// When the job was sealed.
    pub sealed_at: DateTime<Utc>,
}

impl Job {
    /// Seal a job with its final attempt history and status.
    pub fn seal(key: JobKey, attempts: Vec<Attempt>, status: JobStatus, total_duration_ms: u64) -> Self {
        Self {
            id: key.record_id(),
            key,
            attempts,
            status,
            total_duration_ms,
            sealed_at: Utc::now(),
        }
    }

    /// Verdict of the final attempt, if any attempt was recorded.
    pub fn final_verdict(&self) -> Option<AttemptVerdict> {
        self.attempts.last().map(|a| a.verdict)
    }

    /// Number of attempts consumed.
    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }
}

/// The full set of sealed jobs for a run, at most one per key.
///
/// Append-only with respect to completed jobs; duplicate keys keep the
/// first-seen job so resumed runs never shadow an already-sealed record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    jobs: Vec<Job>,
}

impl RunResult {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sealed job. Returns false (and keeps the existing record)
    /// when the key is already present.
    pub fn insert(&mut self, job: Job) -> bool {
        if self.contains(&job.key) {
            return false;
        }
        self.jobs.push(job);
        true
    }

    /// Whether a job with this key is already recorded.
    pub fn contains(&self, key: &JobKey) -> bool {
        self.jobs.iter().any(|j| j.key == *key)
    }

    /// Look up the job for a key.
    pub fn get(&self, key: &JobKey) -> Option<&Job> {
        self.jobs.iter().find(|j| j.key == *key)
    }

    /// All jobs in insertion order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Number of recorded jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attempt::{AttemptVerdict, BackendReport, OutcomeStatus, VerificationOutcome};

    fn attempt(ordinal: u32, verdict: AttemptVerdict) -> Attempt {
        Attempt {
            ordinal,
            annotated_source: "class C { }".to_string(),
            outcomes: vec![BackendReport::new(
                "openjml",
                VerificationOutcome::new(OutcomeStatus::Pass, ""),
            )],
            verdict,
            feedback: String::new(),
            duration_ms: 10,
        }
    }

    #[test]
    fn test_job_key_record_id_stable() {
        let a = JobKey::new("m1", "Calculator");
        let b = JobKey::new("m1", "Calculator");
        assert_eq!(a.record_id(), b.record_id());
        assert_eq!(a.record_id().len(), 16);
    }

    #[test]
    fn test_job_key_record_id_separator() {
        // The separator byte keeps shifted boundaries distinct
        let a = JobKey::new("ab", "c");
        let b = JobKey::new("a", "bc");
        assert_ne!(a.record_id(), b.record_id());
    }

    #[test]
    fn test_job_key_display() {
        let key = JobKey::new("codellama:7b", "TwoSum");
        assert_eq!(key.to_string(), "codellama:7b/TwoSum");
    }

    #[test]
    fn test_job_seal() {
        let key = JobKey::new("m1", "Calculator");
        let job = Job::seal(key.clone(), vec![attempt(1, AttemptVerdict::Pass)], JobStatus::Succeeded, 123);

        assert_eq!(job.id, key.record_id());
        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(job.attempt_count(), 1);
        assert_eq!(job.final_verdict(), Some(AttemptVerdict::Pass));
        assert_eq!(job.total_duration_ms, 123);
    }

    #[test]
    fn test_job_final_verdict_empty() {
        let job = Job::seal(JobKey::new("m1", "U"), Vec::new(), JobStatus::GeneratorUnavailable, 5);
        assert_eq!(job.final_verdict(), None);
    }

    #[test]
    fn test_run_result_uniqueness() {
        let mut result = RunResult::new();
        let key = JobKey::new("m1", "Calculator");

        let first = Job::seal(key.clone(), vec![attempt(1, AttemptVerdict::Pass)], JobStatus::Succeeded, 1);
        let second = Job::seal(key.clone(), Vec::new(), JobStatus::GeneratorUnavailable, 2);

        assert!(result.insert(first));
        assert!(!result.insert(second));
        assert_eq!(result.len(), 1);
        // First-seen record wins
        assert_eq!(result.get(&key).unwrap().status, JobStatus::Succeeded);
    }

    #[test]
    fn test_run_result_lookup() {
        let mut result = RunResult::new();
        assert!(result.is_empty());

        let key = JobKey::new("m1", "TwoSum");
        result.insert(Job::seal(
            key.clone(),
            vec![attempt(1, AttemptVerdict::Fail)],
            JobStatus::ExhaustedRetries,
            9,
        ));

        assert!(result.contains(&key));
        assert!(!result.contains(&JobKey::new("m2", "TwoSum")));
        assert_eq!(result.get(&key).unwrap().key, key);
    }

    #[test]
    fn test_job_serialization_roundtrip() {
        let job = Job::seal(
            JobKey::new("m1", "Clock"),
            vec![attempt(1, AttemptVerdict::Partial)],
            JobStatus::ExhaustedRetries,
            77,
        );

        let json = serde_json::to_string(&job).unwrap();
        let parsed: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, job);
    }
}
