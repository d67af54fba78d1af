//! Source units and model handles.
//!
//! A source unit is one Java file slated for annotation. Units are discovered
//! from a test-cases directory at enumeration time and never mutated. A model
//! handle names a generative backend plus its invocation settings, fixed for
//! the lifetime of a run.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JmlBenchError, Result};

/// Sample case written to the test-cases directory when it is empty, so a
/// first run always has something to evaluate.
const SAMPLE_NAME: &str = "Calculator";
const SAMPLE_CODE: &str = r#"public class Calculator {
    public int add(int a, int b) {
        return a + b;
    }

    public int subtract(int a, int b) {
        return a - b;
    }

    public int multiply(int a, int b) {
        return a * b;
    }

    public double divide(int a, int b) {
        return (double) a / b;
    }
}
"#;

/// An immutable identifier plus the original, unannotated source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Unit name (file stem of the Java file).
    pub name: String,

    /// Original Java source, without annotations.
    pub code: String,
}

impl SourceUnit {
    /// Create a new source unit.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Class name declared in the unit, falling back to the unit name.
    pub fn class_name(&self) -> &str {
        extract_class_name(&self.code).unwrap_or(&self.name)
    }
}

/// Identifier and invocation configuration for one generative backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Model identifier (e.g. "qwen2.5-coder:1.5b").
    pub name: String,

    /// Base URL of the serving endpoint.
    pub base_url: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Timeout per generation call in seconds.
    pub timeout_secs: u64,

    /// Maximum tokens per response (0 = backend default).
    pub max_tokens: u32,
}

impl ModelHandle {
    /// Create a handle with default invocation settings.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            temperature: 0.7,
            timeout_secs: 60,
            max_tokens: 0,
        }
    }

    /// Generation timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Discover all Java source units under `dir`, sorted by name.
///
/// If the directory contains no `.java` files, a sample `Calculator` case is
/// written there and returned, so a run never starts with an empty matrix.
pub fn discover_source_units(dir: &Path) -> Result<Vec<SourceUnit>> {
    fs::create_dir_all(dir)?;

    let pattern = dir.join("*.java");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| JmlBenchError::Discovery(format!("non-UTF8 path: {}", dir.display())))?;

    let mut units = Vec::new();
    let paths = glob::glob(pattern).map_err(|e| JmlBenchError::Discovery(e.to_string()))?;
    for entry in paths {
        let path = entry.map_err(|e| JmlBenchError::Discovery(e.to_string()))?;
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let code = fs::read_to_string(&path)?;
        units.push(SourceUnit::new(stem, code));
    }

    if units.is_empty() {
        log::info!("No test cases in {}, writing sample {}", dir.display(), SAMPLE_NAME);
        fs::write(dir.join(format!("{}.java", SAMPLE_NAME)), SAMPLE_CODE)?;
        units.push(SourceUnit::new(SAMPLE_NAME, SAMPLE_CODE));
    }

    units.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(units)
}

/// Extract the first declared class name from Java source.
///
/// Token scan for `class <Identifier>`, ignoring occurrences inside `//`
/// line comments so commented-out declarations do not win.
pub fn extract_class_name(code: &str) -> Option<&str> {
    for line in code.lines() {
        let line = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };

        let mut tokens = line.split_whitespace().peekable();
        while let Some(token) = tokens.next() {
            if token == "class" {
                if let Some(next) = tokens.peek() {
                    let name: &str = next;
                    let name = name.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_');
                    if !name.is_empty() && name.chars().next().is_some_and(|c| c.is_alphabetic()) {
                        return Some(name);
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_class_name_public() {
        let code = "public class Calculator {\n  public int add(int a, int b) { return a + b; }\n}";
        assert_eq!(extract_class_name(code), Some("Calculator"));
    }

    #[test]
    fn test_extract_class_name_no_modifier() {
        let code = "class BubbleSort { }";
        assert_eq!(extract_class_name(code), Some("BubbleSort"));
    }

    #[test]
    fn test_extract_class_name_brace_attached() {
        let code = "public class TwoSum{ }";
        assert_eq!(extract_class_name(code), Some("TwoSum"));
    }

    #[test]
    fn test_extract_class_name_skips_comments() {
        let code = "// class Old\npublic class New { }";
        assert_eq!(extract_class_name(code), Some("New"));
    }

    #[test]
    fn test_extract_class_name_none() {
        let code = "interface Foo { }";
        assert_eq!(extract_class_name(code), None);
    }

    #[test]
    fn test_source_unit_class_name_fallback() {
        let unit = SourceUnit::new("Fallback", "not java at all");
        assert_eq!(unit.class_name(), "Fallback");
    }

    #[test]
    fn test_model_handle_defaults() {
        let handle = ModelHandle::new("codellama:7b", "http://localhost:11434");
        assert_eq!(handle.temperature, 0.7);
        assert_eq!(handle.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_discover_source_units() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("B.java"), "public class B { }").unwrap();
        fs::write(temp.path().join("A.java"), "public class A { }").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let units = discover_source_units(temp.path()).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "A");
        assert_eq!(units[1].name, "B");
    }

    #[test]
    fn test_discover_writes_sample_when_empty() {
        let temp = TempDir::new().unwrap();
        let units = discover_source_units(temp.path()).unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "Calculator");
        assert!(temp.path().join("Calculator.java").exists());

        // Second discovery finds the written sample on disk
        let again = discover_source_units(temp.path()).unwrap();
        assert_eq!(again, units);
    }
}
