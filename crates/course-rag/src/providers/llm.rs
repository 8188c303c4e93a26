//! LLM provider trait for text generation

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Trait for hosted language models
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate free text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text constrained to a JSON document, where the backend
    /// supports it. Defaults to plain generation.
    async fn generate_json(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// Bound a model call by `limit`; expiry is reported as `ModelUnavailable`
pub async fn with_timeout<T, F>(limit: Duration, what: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::model(format!(
            "{} timed out after {}s",
            what,
            limit.as_secs()
        ))),
    }
}
