//! Append-only JSONL store for sealed jobs.
//!
//! Each sealed job is one JSON line, flushed on append. A crash between
//! jobs loses nothing; a crash mid-write leaves at most one truncated
//! trailing line, which loading skips with a warning. Sealed records are
//! never rewritten, so a record's bytes are identical across any number
//! of resumed runs.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::domain::{Job, RunResult};
use crate::error::{JmlBenchError, Result};

/// Single-file JSONL store keyed by job record id.
pub struct JobStore {
    path: PathBuf,
    sealed_ids: HashSet<String>,
}

impl JobStore {
    /// Open the store, creating parent directories as needed. Existing
    /// records are indexed so `contains` answers without re-reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut store = Self {
            path,
            sealed_ids: HashSet::new(),
        };
        for job in store.load()?.jobs() {
            store.sealed_ids.insert(job.id.clone());
        }
        Ok(store)
    }

    /// Path of the backing JSONL file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a sealed record for this id already exists.
    pub fn contains(&self, record_id: &str) -> bool {
        self.sealed_ids.contains(record_id)
    }

    /// Append one sealed job and flush it to disk before returning.
    ///
    /// Duplicate ids are rejected; the first sealed record for a key is
    /// authoritative and must never be shadowed by a later line.
    pub fn append(&mut self, job: &Job) -> Result<()> {
        if self.sealed_ids.contains(&job.id) {
            return Err(JmlBenchError::Storage(format!(
                "record {} already sealed, refusing to append a duplicate",
                job.id
            )));
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(job)?)?;
        file.flush()?;

        self.sealed_ids.insert(job.id.clone());
        Ok(())
    }

    /// Load every intact record from disk.
    ///
    /// Unparseable lines are skipped with a warning rather than failing
    /// the load; a crash mid-append legitimately truncates the last line.
    /// Duplicate keys keep the first-seen record.
    pub fn load(&self) -> Result<RunResult> {
        let mut result = RunResult::new();

        if !self.path.exists() {
            return Ok(result);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        // Split on raw bytes; a corrupt line must not abort the load
        for (lineno, segment) in reader.split(b'\n').enumerate() {
            let line = match String::from_utf8(segment?) {
                Ok(line) => line,
                Err(err) => {
                    log::warn!(
                        "Skipping non-UTF-8 record at {}:{}: {}",
                        self.path.display(),
                        lineno + 1,
                        err
                    );
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Job>(&line) {
                Ok(job) => {
                    if !result.insert(job) {
                        log::warn!(
                            "Duplicate record at {}:{}, keeping the earlier one",
                            self.path.display(),
                            lineno + 1
                        );
                    }
                }
                Err(err) => {
                    log::warn!(
                        "Skipping unparseable record at {}:{}: {}",
                        self.path.display(),
                        lineno + 1,
                        err
                    );
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobKey, JobStatus};
    use tempfile::TempDir;

    fn sealed_job(model: &str, unit: &str, status: JobStatus) -> Job {
        Job::seal(JobKey::new(model, unit), Vec::new(), status, 100)
    }

    fn store_path(temp: &TempDir) -> PathBuf {
        temp.path().join("results.jsonl")
    }

    #[test]
    fn test_append_and_load() {
        let temp = TempDir::new().unwrap();
        let mut store = JobStore::open(store_path(&temp)).unwrap();

        let job = sealed_job("m1", "Calculator", JobStatus::Succeeded);
        store.append(&job).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&job.key).unwrap().status, JobStatus::Succeeded);
    }

    #[test]
    fn test_contains_after_reopen() {
        let temp = TempDir::new().unwrap();
        let job = sealed_job("m1", "Calculator", JobStatus::ExhaustedRetries);

        {
            let mut store = JobStore::open(store_path(&temp)).unwrap();
            store.append(&job).unwrap();
        }

        let store = JobStore::open(store_path(&temp)).unwrap();
        assert!(store.contains(&job.id));
        assert!(!store.contains("0000000000000000"));
    }

    #[test]
    fn test_duplicate_append_rejected() {
        let temp = TempDir::new().unwrap();
        let mut store = JobStore::open(store_path(&temp)).unwrap();

        let job = sealed_job("m1", "Calculator", JobStatus::Succeeded);
        store.append(&job).unwrap();
        assert!(store.append(&job).is_err());

        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_truncated_trailing_line_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);

        let mut store = JobStore::open(&path).unwrap();
        store.append(&sealed_job("m1", "A", JobStatus::Succeeded)).unwrap();
        store.append(&sealed_job("m1", "B", JobStatus::Succeeded)).unwrap();

        // Simulate a crash mid-append: a partial JSON object on the last line
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "{{\"id\":\"dead").unwrap();
        drop(file);

        let store = JobStore::open(&path).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);

        let mut store = JobStore::open(&path).unwrap();
        store.append(&sealed_job("m1", "A", JobStatus::Succeeded)).unwrap();

        // Corrupt line of raw bytes between two valid records
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xff, 0xfe, 0x80, b'\n']).unwrap();
        drop(file);

        let mut store = JobStore::open(&path).unwrap();
        store.append(&sealed_job("m1", "B", JobStatus::Succeeded)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_sealed_record_bytes_stable_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);

        let mut store = JobStore::open(&path).unwrap();
        store.append(&sealed_job("m1", "Calculator", JobStatus::Succeeded)).unwrap();
        let first = std::fs::read(&path).unwrap();

        // Reopening and appending never rewrites existing lines
        let mut store = JobStore::open(&path).unwrap();
        store.append(&sealed_job("m2", "Calculator", JobStatus::Succeeded)).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert!(second.starts_with(&first));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let store = JobStore::open(store_path(&temp)).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_lines_keep_first_record() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);

        let a = sealed_job("m1", "Calculator", JobStatus::Succeeded);
        let b = sealed_job("m1", "Calculator", JobStatus::ExhaustedRetries);

        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", serde_json::to_string(&a).unwrap()).unwrap();
        writeln!(file, "{}", serde_json::to_string(&b).unwrap()).unwrap();
        drop(file);

        let store = JobStore::open(&path).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&a.key).unwrap().status, JobStatus::Succeeded);
    }
}
