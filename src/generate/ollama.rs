//! Ollama generator client.
//!
//! Implements `AnnotationGenerator` against the Ollama `/api/generate`
//! endpoint, non-streaming. One client per model handle; the handle's
//! timeout bounds every call.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::domain::{ModelHandle, SourceUnit};
use crate::error::{JmlBenchError, Result};

use super::client::{AnnotationGenerator, GenerationFailure};
use super::extract::extract_annotated_code;
use super::prompt::build_prompt;

/// Client for one Ollama-served model.
pub struct OllamaClient {
    client: Client,
    handle: ModelHandle,
}

impl OllamaClient {
    /// Create a client for the given model handle.
    pub fn new(handle: ModelHandle) -> Result<Self> {
        let client = Client::builder()
            .timeout(handle.timeout())
            .build()
            .map_err(|e| JmlBenchError::Generator(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, handle })
    }

    /// The model handle this client was built for.
    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.handle.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, prompt: &str) -> Value {
        let mut options = json!({ "temperature": self.handle.temperature });
        if self.handle.max_tokens > 0 {
            options["num_predict"] = json!(self.handle.max_tokens);
        }

        json!({
            "model": self.handle.name,
            "prompt": prompt,
            "stream": false,
            "options": options,
        })
    }

    fn classify_transport_error(err: reqwest::Error) -> GenerationFailure {
        if err.is_timeout() {
            GenerationFailure::Timeout
        } else {
            GenerationFailure::BackendUnreachable(err.to_string())
        }
    }
}

#[async_trait]
impl AnnotationGenerator for OllamaClient {
    async fn generate(&self, unit: &SourceUnit, feedback: &str) -> std::result::Result<String, GenerationFailure> {
        let prompt = build_prompt(unit, feedback);
        let body = self.build_body(&prompt);

        tracing::debug!(model = %self.handle.name, unit = %unit.name, "Requesting generation");

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationFailure::BackendUnreachable(format!(
                "HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GenerationFailure::MalformedExtraction(format!("invalid JSON body: {}", e)))?;

        let raw = payload.get("response").and_then(|v| v.as_str()).unwrap_or("");
        extract_annotated_code(raw)
    }
}
