//! Extraction of annotated source from raw model replies.
//!
//! Models routinely wrap code in markdown fences despite being told not to.
//! This module strips those and validates that the reply actually contains a
//! Java class.

use crate::domain::extract_class_name;

use super::client::GenerationFailure;

/// Extract annotated Java source from a raw model reply.
///
/// Strips a ```java ... ``` fence when present (taking the span between the
/// first opening fence and the last closing fence, matching how models tend
/// to add prose around a single block). The result must contain a Java class
/// declaration or extraction is considered malformed.
pub fn extract_annotated_code(raw: &str) -> Result<String, GenerationFailure> {
    if raw.trim().is_empty() {
        return Err(GenerationFailure::EmptyResponse);
    }

    let code = match raw.find("```java") {
        Some(start) => {
            let body_start = start + "```java".len();
            let rest = &raw[body_start..];
            match rest.rfind("```") {
                Some(end) => rest[..end].trim(),
                None => {
                    return Err(GenerationFailure::MalformedExtraction(
                        "unterminated ```java fence".to_string(),
                    ));
                }
            }
        }
        None => match raw.find("```") {
            // Generic fence without a language tag
            Some(start) => {
                let body_start = start + 3;
                let rest = &raw[body_start..];
                match rest.rfind("```") {
                    Some(end) => rest[..end].trim(),
                    None => {
                        return Err(GenerationFailure::MalformedExtraction(
                            "unterminated ``` fence".to_string(),
                        ));
                    }
                }
            }
            None => raw.trim(),
        },
    };

    if code.is_empty() {
        return Err(GenerationFailure::EmptyResponse);
    }

    if extract_class_name(code).is_none() {
        return Err(GenerationFailure::MalformedExtraction(
            "no Java class declaration in reply".to_string(),
        ));
    }

    Ok(code.to_string())
}
