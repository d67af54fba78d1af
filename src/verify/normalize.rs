//! Verdict normalization - pure reduction of backend outcomes.
//!
//! `combine` maps the per-backend outcomes of one attempt to the overall
//! verdict, and `extract_feedback` produces the diagnostic text fed into the
//! next attempt's prompt. Both are pure functions over the sealed outcome
//! list; nothing here touches processes or state.

use crate::domain::{AttemptVerdict, BackendReport, OutcomeStatus};

/// Combine backend outcomes into one attempt verdict.
///
/// - `Pass` iff there is at least one outcome and every outcome is `Pass`.
/// - `Fail` iff at least one outcome is `Fail`.
/// - `Partial` otherwise: at least one `Inconclusive` and no `Fail`, or no
///   outcomes at all (a generation failure produced nothing to judge).
pub fn combine(reports: &[BackendReport]) -> AttemptVerdict {
    if reports.iter().any(|r| r.outcome.status == OutcomeStatus::Fail) {
        return AttemptVerdict::Fail;
    }
    if !reports.is_empty() && reports.iter().all(|r| r.outcome.status == OutcomeStatus::Pass) {
        return AttemptVerdict::Pass;
    }
    AttemptVerdict::Partial
}

/// Extract the feedback string for the next attempt.
///
/// Concatenates the diagnostics of every non-pass backend in declaration
/// order. Empty when every backend passed.
pub fn extract_feedback(reports: &[BackendReport]) -> String {
    let failing: Vec<&BackendReport> = reports
        .iter()
        .filter(|r| r.outcome.status != OutcomeStatus::Pass)
        .collect();

    if failing.is_empty() {
        return String::new();
    }

    let mut feedback = String::from("Issues found:\n");
    for report in failing {
        feedback.push_str(&format!("- {} ({}):\n", report.backend, report.outcome.status));
        if report.outcome.diagnostics.is_empty() {
            feedback.push_str("  (no diagnostics captured)\n");
        } else {
            for line in report.outcome.diagnostics.lines() {
                feedback.push_str(&format!("  {}\n", line));
            }
        }
    }
    feedback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerificationOutcome;

    const STATUSES: [OutcomeStatus; 3] = [OutcomeStatus::Pass, OutcomeStatus::Fail, OutcomeStatus::Inconclusive];

    fn reports(a: OutcomeStatus, b: OutcomeStatus, c: OutcomeStatus) -> Vec<BackendReport> {
        vec![
            BackendReport::new("openjml", VerificationOutcome::new(a, "openjml diag")),
            BackendReport::new("spotbugs", VerificationOutcome::new(b, "spotbugs diag")),
            BackendReport::new("key", VerificationOutcome::new(c, "key diag")),
        ]
    }

    /// Exhaustive truth table over the full 3x3x3 outcome space.
    #[test]
    fn test_combine_truth_table() {
        for a in STATUSES {
            for b in STATUSES {
                for c in STATUSES {
                    let verdict = combine(&reports(a, b, c));
                    let statuses = [a, b, c];

                    let expected = if statuses.contains(&OutcomeStatus::Fail) {
                        AttemptVerdict::Fail
                    } else if statuses.iter().all(|s| *s == OutcomeStatus::Pass) {
                        AttemptVerdict::Pass
                    } else {
                        AttemptVerdict::Partial
                    };

                    assert_eq!(verdict, expected, "statuses: {:?}", statuses);
                }
            }
        }
    }

    #[test]
    fn test_combine_pass_requires_all_pass() {
        assert_eq!(
            combine(&reports(OutcomeStatus::Pass, OutcomeStatus::Pass, OutcomeStatus::Pass)),
            AttemptVerdict::Pass
        );
    }

    #[test]
    fn test_combine_fail_dominates_inconclusive() {
        assert_eq!(
            combine(&reports(OutcomeStatus::Fail, OutcomeStatus::Inconclusive, OutcomeStatus::Pass)),
            AttemptVerdict::Fail
        );
    }

    #[test]
    fn test_combine_inconclusive_is_partial_not_fail() {
        assert_eq!(
            combine(&reports(OutcomeStatus::Pass, OutcomeStatus::Inconclusive, OutcomeStatus::Pass)),
            AttemptVerdict::Partial
        );
    }

    #[test]
    fn test_combine_empty_is_partial() {
        assert_eq!(combine(&[]), AttemptVerdict::Partial);
    }

    #[test]
    fn test_combine_is_pure() {
        let r = reports(OutcomeStatus::Fail, OutcomeStatus::Pass, OutcomeStatus::Inconclusive);
        assert_eq!(combine(&r), combine(&r));
    }

    #[test]
    fn test_extract_feedback_all_pass_is_empty() {
        let feedback = extract_feedback(&reports(OutcomeStatus::Pass, OutcomeStatus::Pass, OutcomeStatus::Pass));
        assert!(feedback.is_empty());
    }

    #[test]
    fn test_extract_feedback_declaration_order() {
        let feedback = extract_feedback(&reports(
            OutcomeStatus::Fail,
            OutcomeStatus::Pass,
            OutcomeStatus::Inconclusive,
        ));

        assert!(feedback.starts_with("Issues found:"));
        let openjml = feedback.find("openjml").unwrap();
        let key = feedback.find("key").unwrap();
        assert!(openjml < key);
        // The passing backend contributes nothing
        assert!(!feedback.contains("spotbugs"));
    }

    #[test]
    fn test_extract_feedback_includes_diagnostics_and_status() {
        let feedback = extract_feedback(&reports(OutcomeStatus::Pass, OutcomeStatus::Fail, OutcomeStatus::Pass));
        assert!(feedback.contains("spotbugs (fail)"));
        assert!(feedback.contains("spotbugs diag"));
    }

    #[test]
    fn test_extract_feedback_empty_diagnostics_noted() {
        let reports = vec![BackendReport::new(
            "key",
            VerificationOutcome::new(OutcomeStatus::Inconclusive, ""),
        )];
        let feedback = extract_feedback(&reports);
        assert!(feedback.contains("no diagnostics captured"));
    }
}
