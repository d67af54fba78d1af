//! Error types for jmlbench
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in jmlbench
#[derive(Debug, Error)]
pub enum JmlBenchError {
    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Test-case discovery error
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generator backend error
    #[error("Generator error: {0}")]
    Generator(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for jmlbench operations
pub type Result<T> = std::result::Result<T, JmlBenchError>;
