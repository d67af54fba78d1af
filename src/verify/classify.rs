//! Per-tool output classifiers.
//!
//! Classification rules are configuration, not pipeline logic: each tool
//! contributes a plain function mapping (exit code, stdout, stderr) to a
//! three-valued status plus diagnostic text, so a new tool is added by
//! supplying a classifier rather than threading conditionals through the
//! pipeline.
//!
//! Rules recovered from each tool's observed output:
//! - OpenJML: any "error" in the output fails; a clean exit with no error
//!   marker passes.
//! - SpotBugs: "ERROR" lines fail with those lines as diagnostics; a
//!   completed run without them passes.
//! - KeY: "Proof completed" passes; "ERROR" lines fail; neither marker means
//!   the run told us nothing.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BackendsConfig;
use crate::domain::OutcomeStatus;

use super::backend::{ToolBackend, VerificationBackend};

/// Classifier strategy: (exit code, stdout, stderr) -> (status, diagnostics).
pub type Classifier = fn(Option<i32>, &str, &str) -> (OutcomeStatus, String);

/// Maximum diagnostic lines kept per backend.
const MAX_DIAGNOSTIC_LINES: usize = 50;

/// Classify OpenJML compile-check output.
pub fn classify_openjml(exit: Option<i32>, stdout: &str, stderr: &str) -> (OutcomeStatus, String) {
    let combined = format!("{}\n{}", stdout, stderr);
    let error_lines = lines_containing(&combined, "error");

    if !error_lines.is_empty() {
        return (OutcomeStatus::Fail, truncate_lines(&error_lines.join("\n"), MAX_DIAGNOSTIC_LINES));
    }

    match exit {
        Some(0) => (OutcomeStatus::Pass, String::new()),
        Some(code) => (
            OutcomeStatus::Inconclusive,
            format!("exit code {} with no recognizable diagnostics", code),
        ),
        None => (OutcomeStatus::Inconclusive, "terminated by signal".to_string()),
    }
}

/// Classify SpotBugs static-analysis output.
pub fn classify_spotbugs(exit: Option<i32>, stdout: &str, stderr: &str) -> (OutcomeStatus, String) {
    let combined = format!("{}\n{}", stdout, stderr);
    let error_lines = lines_containing(&combined, "ERROR");

    if !error_lines.is_empty() {
        return (OutcomeStatus::Fail, truncate_lines(&error_lines.join("\n"), MAX_DIAGNOSTIC_LINES));
    }

    match exit {
        // SpotBugs exit codes encode bug/error bits; absence of ERROR lines
        // on a completed run is the pass condition
        Some(_) => (OutcomeStatus::Pass, String::new()),
        None => (OutcomeStatus::Inconclusive, "terminated by signal".to_string()),
    }
}

/// Classify KeY deductive-proof output.
pub fn classify_key(_exit: Option<i32>, stdout: &str, stderr: &str) -> (OutcomeStatus, String) {
    if stdout.contains("Proof completed") {
        return (OutcomeStatus::Pass, String::new());
    }

    let combined = format!("{}\n{}", stdout, stderr);
    let error_lines = lines_containing(&combined, "ERROR");
    if !error_lines.is_empty() {
        return (OutcomeStatus::Fail, truncate_lines(&error_lines.join("\n"), MAX_DIAGNOSTIC_LINES));
    }

    (OutcomeStatus::Inconclusive, "no proof marker in output".to_string())
}

/// Build the three standard backends in declaration order:
/// OpenJML (compile check), SpotBugs (static analysis), KeY (deductive proof).
pub fn standard_backends(config: &BackendsConfig) -> Vec<Arc<dyn VerificationBackend>> {
    vec![
        Arc::new(ToolBackend::new(
            "openjml",
            &config.openjml.program,
            config.openjml.args.clone(),
            Duration::from_secs(config.openjml.timeout_secs),
            classify_openjml,
        )),
        Arc::new(ToolBackend::new(
            "spotbugs",
            &config.spotbugs.program,
            config.spotbugs.args.clone(),
            Duration::from_secs(config.spotbugs.timeout_secs),
            classify_spotbugs,
        )),
        Arc::new(ToolBackend::new(
            "key",
            &config.key.program,
            config.key.args.clone(),
            Duration::from_secs(config.key.timeout_secs),
            classify_key,
        )),
    ]
}

/// Lines of `output` containing `needle`, trimmed.
fn lines_containing<'a>(output: &'a str, needle: &str) -> Vec<&'a str> {
    output
        .lines()
        .filter(|line| line.contains(needle))
        .map(|line| line.trim())
        .collect()
}

/// Truncate text to a maximum number of lines.
fn truncate_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().take(max_lines).collect();
    let truncated = lines.len() < text.lines().count();
    let mut result = lines.join("\n");
    if truncated {
        result.push_str("\n... (truncated)");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openjml_pass() {
        let (status, diag) = classify_openjml(Some(0), "Note: compiled Calculator.java\n", "");
        assert_eq!(status, OutcomeStatus::Pass);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_openjml_fail_on_error_marker() {
        let output = "Calculator.java:4: error: incompatible types in ensures clause\n1 error\n";
        let (status, diag) = classify_openjml(Some(1), output, "");
        assert_eq!(status, OutcomeStatus::Fail);
        assert!(diag.contains("incompatible types"));
    }

    #[test]
    fn test_openjml_error_in_stderr() {
        let (status, _) = classify_openjml(Some(0), "", "error: invalid JML clause");
        assert_eq!(status, OutcomeStatus::Fail);
    }

    #[test]
    fn test_openjml_nonzero_without_marker_is_inconclusive() {
        let (status, diag) = classify_openjml(Some(2), "warning: something odd\n", "");
        assert_eq!(status, OutcomeStatus::Inconclusive);
        assert!(diag.contains("exit code 2"));
    }

    #[test]
    fn test_openjml_signal_is_inconclusive() {
        let (status, _) = classify_openjml(None, "", "");
        assert_eq!(status, OutcomeStatus::Inconclusive);
    }

    #[test]
    fn test_spotbugs_pass() {
        let (status, _) = classify_spotbugs(Some(0), "No bugs found\n", "");
        assert_eq!(status, OutcomeStatus::Pass);
    }

    #[test]
    fn test_spotbugs_fail_collects_error_lines() {
        let output = "M C NP: ok line\nERROR: Null pointer dereference in add()\nERROR: Unused field\n";
        let (status, diag) = classify_spotbugs(Some(1), output, "");
        assert_eq!(status, OutcomeStatus::Fail);
        assert!(diag.contains("Null pointer dereference"));
        assert!(diag.contains("Unused field"));
    }

    #[test]
    fn test_spotbugs_nonzero_without_errors_passes() {
        // SpotBugs sets exit bits for found bugs of lower severities too
        let (status, _) = classify_spotbugs(Some(1), "analysis done\n", "");
        assert_eq!(status, OutcomeStatus::Pass);
    }

    #[test]
    fn test_key_pass_on_proof_marker() {
        let (status, _) = classify_key(Some(0), "Loading...\nProof completed\n", "");
        assert_eq!(status, OutcomeStatus::Pass);
    }

    #[test]
    fn test_key_fail_on_error_lines() {
        let (status, diag) = classify_key(Some(1), "ERROR: open goal remains\n", "");
        assert_eq!(status, OutcomeStatus::Fail);
        assert!(diag.contains("open goal"));
    }

    #[test]
    fn test_key_no_marker_is_inconclusive() {
        let (status, diag) = classify_key(Some(0), "Loading proof obligations...\n", "");
        assert_eq!(status, OutcomeStatus::Inconclusive);
        assert!(diag.contains("no proof marker"));
    }

    #[test]
    fn test_standard_backends_declaration_order() {
        let backends = standard_backends(&BackendsConfig::default());
        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["openjml", "spotbugs", "key"]);
    }

    #[test]
    fn test_truncate_lines() {
        let text: String = (0..60).map(|i| format!("ERROR: line {}\n", i)).collect();
        let truncated = truncate_lines(&text, 50);
        assert!(truncated.contains("line 49"));
        assert!(!truncated.contains("line 50\n"));
        assert!(truncated.contains("... (truncated)"));
    }

    #[test]
    fn test_lines_containing() {
        let output = "ok\n  ERROR: one  \nfine\nERROR: two\n";
        let lines = lines_containing(output, "ERROR");
        assert_eq!(lines, vec!["ERROR: one", "ERROR: two"]);
    }
}
