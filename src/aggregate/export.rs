//! Export of a sealed result set: a flat CSV table and the annotated
//! source artifacts for offline inspection.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::domain::RunResult;
use crate::error::Result;

/// Write one CSV row per job.
///
/// Backend columns are derived from the backends actually present in the
/// result set, in sorted order, and carry the final attempt's status for
/// that backend (empty when the backend never reported).
pub fn write_csv(result: &RunResult, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let backends: BTreeSet<&str> = result
        .jobs()
        .iter()
        .flat_map(|j| j.attempts.iter())
        .flat_map(|a| a.outcomes.iter())
        .map(|r| r.backend.as_str())
        .collect();

    let mut file = fs::File::create(path)?;

    let mut header = vec![
        "model".to_string(),
        "unit".to_string(),
        "status".to_string(),
        "attempts".to_string(),
        "final_verdict".to_string(),
        "duration_ms".to_string(),
    ];
    header.extend(backends.iter().map(|b| b.to_string()));
    writeln!(file, "{}", header.join(","))?;

    for job in result.jobs() {
        let final_attempt = job.attempts.last();
        let mut row = vec![
            csv_field(&job.key.model),
            csv_field(&job.key.unit),
            job.status.to_string(),
            job.attempt_count().to_string(),
            job.final_verdict().map(|v| v.to_string()).unwrap_or_default(),
            job.total_duration_ms.to_string(),
        ];
        for backend in &backends {
            let status = final_attempt
                .and_then(|a| a.outcome_for(backend))
                .map(|o| o.status.as_str().to_string())
                .unwrap_or_default();
            row.push(status);
        }
        writeln!(file, "{}", row.join(","))?;
    }

    file.flush()?;
    log::info!("Wrote {} rows to {}", result.len(), path.display());
    Ok(())
}

/// Write each job's last generated annotated source under
/// `dir/<model>/<unit>.java`.
///
/// Failed candidates are written too; a near-miss annotation is often the
/// most useful artifact to inspect. Jobs that never generated are skipped.
pub fn write_code_artifacts(result: &RunResult, dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let mut written = 0usize;

    for job in result.jobs() {
        let Some(attempt) = job.attempts.iter().rev().find(|a| a.generated()) else {
            continue;
        };

        let model_dir = dir.join(sanitize(&job.key.model));
        fs::create_dir_all(&model_dir)?;

        let path = model_dir.join(format!("{}.java", sanitize(&job.key.unit)));
        fs::write(&path, &attempt.annotated_source)?;
        written += 1;
    }

    log::info!("Wrote {} code artifacts under {}", written, dir.display());
    Ok(written)
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Replace path-hostile characters in model and unit names. Model tags like
/// `codellama:7b` are common and must not create nested directories.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}
