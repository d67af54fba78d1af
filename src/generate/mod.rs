//! Annotation generation - the generative-model seam.
//!
//! `AnnotationGenerator` is the uniform call contract for producing annotated
//! source from a source unit plus optional feedback. `OllamaClient` is the
//! production implementation; tests inject fakes through the trait.

pub mod client;
pub mod extract;
pub mod ollama;
pub mod prompt;

pub use client::{AnnotationGenerator, GenerationFailure};
pub use extract::extract_annotated_code;
pub use ollama::OllamaClient;
pub use prompt::build_prompt;
