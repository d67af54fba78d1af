//! Verification - backend adapters and verdict normalization.
//!
//! Each external tool (OpenJML, SpotBugs, KeY) sits behind a `ToolBackend`
//! that writes the candidate to an isolated location, invokes the tool under
//! a bounded timeout, and classifies the raw output into a three-valued
//! outcome. `normalize` reduces the per-backend outcomes to one attempt
//! verdict and extracts feedback for the next attempt.

pub mod backend;
pub mod classify;
pub mod normalize;

pub use backend::{ToolBackend, VerificationBackend};
pub use classify::{Classifier, classify_key, classify_openjml, classify_spotbugs, standard_backends};
pub use normalize::{combine, extract_feedback};
