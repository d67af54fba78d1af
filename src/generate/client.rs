//! Generator call contract and failure taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SourceUnit;

/// Typed failure of a single generation call.
///
/// The adapter never retries internally; retry policy lives in the attempt
/// controller so this stays a pure single-shot call with a bounded timeout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    /// The call exceeded its configured timeout.
    #[error("generation timed out")]
    Timeout,

    /// The generator endpoint could not be reached.
    #[error("generator backend unreachable: {0}")]
    BackendUnreachable(String),

    /// The generator returned an empty response.
    #[error("generator returned an empty response")]
    EmptyResponse,

    /// No annotated Java source could be extracted from the reply.
    #[error("could not extract annotated source: {0}")]
    MalformedExtraction(String),
}

/// Uniform contract for the generative-model backend.
///
/// `feedback` carries diagnostics from the previous attempt; when non-empty
/// it must be incorporated into the prompt so regeneration is feedback-driven
/// rather than a blind repeat. Implementations must not mutate the source
/// unit or hold state across calls.
#[async_trait]
pub trait AnnotationGenerator: Send + Sync {
    /// Generate annotated source for the unit, steering by `feedback`.
    async fn generate(&self, unit: &SourceUnit, feedback: &str) -> Result<String, GenerationFailure>;
}
