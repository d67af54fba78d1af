//! Attempts and verification outcomes.
//!
//! One attempt is a single generate+verify cycle for a (model, source-unit)
//! pair. Each of the three external tools contributes a `VerificationOutcome`
//! with a three-valued status; the attempt's overall verdict is a pure
//! function of those outcomes (see `verify::normalize`). Attempts are sealed
//! into their parent job and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A single backend's three-valued result for one attempt.
///
/// `Inconclusive` covers tool crash, timeout, and unparsable output. It is
/// never coerced into `Fail` or `Pass` - conflating "proved wrong" with
/// "could not be evaluated" corrupts the aggregated statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Pass,
    Fail,
    Inconclusive,
}

impl OutcomeStatus {
    /// Human-readable name for the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Pass => "pass",
            OutcomeStatus::Fail => "fail",
            OutcomeStatus::Inconclusive => "inconclusive",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One backend's result for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Three-valued status.
    pub status: OutcomeStatus,

    /// Raw diagnostic text extracted from the tool output.
    pub diagnostics: String,

    /// Exit code of the tool process, if it completed.
    pub exit_code: Option<i32>,

    /// How long the tool invocation took in milliseconds.
    pub duration_ms: u64,
}

impl VerificationOutcome {
    /// Create an outcome with the given status and diagnostics.
    pub fn new(status: OutcomeStatus, diagnostics: impl Into<String>) -> Self {
        Self {
            status,
            diagnostics: diagnostics.into(),
            exit_code: None,
            duration_ms: 0,
        }
    }

    /// Set the exit code.
    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    /// Set the duration.
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    /// An `Inconclusive` outcome for a tool that could not be evaluated.
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::Inconclusive, reason)
    }
}

/// A named backend outcome, kept in backend declaration order.
///
/// Declaration order matters: feedback for the next attempt concatenates
/// non-pass diagnostics in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendReport {
    /// Backend name (e.g. "openjml").
    pub backend: String,

    /// The backend's outcome.
    pub outcome: VerificationOutcome,
}

impl BackendReport {
    /// Create a report for a backend.
    pub fn new(backend: impl Into<String>, outcome: VerificationOutcome) -> Self {
        Self {
            backend: backend.into(),
            outcome,
        }
    }
}

/// Overall verdict of one attempt, derived from all backend outcomes.
///
/// `Partial` means at least one backend was `Inconclusive` and none failed.
/// The three-way split is preserved through to aggregation; collapsing
/// `Partial` into either side misrepresents the measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptVerdict {
    Pass,
    Fail,
    Partial,
}

impl AttemptVerdict {
    /// Human-readable name for the verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptVerdict::Pass => "pass",
            AttemptVerdict::Fail => "fail",
            AttemptVerdict::Partial => "partial",
        }
    }
}

impl std::fmt::Display for AttemptVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One generate+verify cycle, immutable once sealed into its job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based attempt ordinal within the job.
    pub ordinal: u32,

    /// Generated annotated source; empty when generation failed.
    pub annotated_source: String,

    /// Per-backend outcomes in declaration order; empty when generation failed.
    pub outcomes: Vec<BackendReport>,

    /// Overall verdict derived from the outcomes.
    pub verdict: AttemptVerdict,

    /// Feedback text extracted for the next attempt's prompt.
    pub feedback: String,

    /// Wall-clock time for the full cycle in milliseconds.
    pub duration_ms: u64,
}

impl Attempt {
    /// Look up the outcome of a named backend.
    pub fn outcome_for(&self, backend: &str) -> Option<&VerificationOutcome> {
        self.outcomes.iter().find(|r| r.backend == backend).map(|r| &r.outcome)
    }

    /// Whether this attempt produced annotated source at all.
    pub fn generated(&self) -> bool {
        !self.annotated_source.is_empty()
    }
}
