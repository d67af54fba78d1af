//! Generic external-tool backend adapter.
//!
//! One `ToolBackend` wraps one verification tool behind a uniform call
//! contract: write the candidate source to a fresh temporary directory,
//! invoke the tool with a bounded timeout, capture exit code and output,
//! and classify. A crash, spawn failure, or timeout maps to `Inconclusive`,
//! never `Fail` - "could not be evaluated" is not "proved wrong".

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::VerificationOutcome;

use super::classify::Classifier;

/// Uniform contract for one verification tool.
///
/// `verify` is infallible: anything that prevents a real verdict
/// becomes an `Inconclusive` outcome instead of an error, so the attempt
/// always seals with all backends accounted for.
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Backend name as it appears in attempt records.
    fn name(&self) -> &str;

    /// Verify one candidate annotated source.
    async fn verify(&self, class_name: &str, annotated_source: &str) -> VerificationOutcome;
}

/// A verification tool invoked as an external process.
pub struct ToolBackend {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    classifier: Classifier,
}

impl ToolBackend {
    /// Create a backend for the given tool command.
    ///
    /// The candidate file path is appended as the final argument.
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
        timeout: Duration,
        classifier: Classifier,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            timeout,
            classifier,
        }
    }

    /// The configured timeout for one invocation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl VerificationBackend for ToolBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn verify(&self, class_name: &str, annotated_source: &str) -> VerificationOutcome {
        let start = Instant::now();

        // Fresh directory per invocation keeps parallel runs from colliding
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return VerificationOutcome::inconclusive(format!("could not create temp dir: {}", e))
                    .with_duration_ms(start.elapsed().as_millis() as u64);
            }
        };

        let file_path = dir.path().join(format!("{}.java", class_name));
        if let Err(e) = tokio::fs::write(&file_path, annotated_source).await {
            return VerificationOutcome::inconclusive(format!("could not write candidate: {}", e))
                .with_duration_ms(start.elapsed().as_millis() as u64);
        }

        // kill_on_drop reaps the child when the timeout drops the future,
        // so a hung tool cannot outlive its temp dir
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&self.args)
                .arg(&file_path)
                .current_dir(dir.path())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        match output {
            Ok(Ok(output)) => {
                let exit_code = output.status.code();
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);

                let (status, diagnostics) = (self.classifier)(exit_code, &stdout, &stderr);
                tracing::debug!(
                    backend = %self.name,
                    status = %status,
                    exit_code = ?exit_code,
                    "Tool invocation classified"
                );

                VerificationOutcome::new(status, diagnostics)
                    .with_exit_code(exit_code)
                    .with_duration_ms(duration_ms)
            }
            Ok(Err(e)) => {
                tracing::debug!(backend = %self.name, error = %e, "Tool failed to start");
                VerificationOutcome::inconclusive(format!("{} failed to start: {}", self.program, e))
                    .with_duration_ms(duration_ms)
            }
            Err(_) => {
                tracing::debug!(backend = %self.name, timeout = ?self.timeout, "Tool timed out");
                VerificationOutcome::inconclusive(format!("timed out after {:?}", self.timeout))
                    .with_duration_ms(duration_ms)
            }
        }
    }
}
