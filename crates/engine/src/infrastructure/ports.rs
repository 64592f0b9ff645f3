//! Port traits for infrastructure boundaries.
//!
//! The LLM port is the engine's only abstraction over the outside world:
//! every player decision suspends on it, and tests swap in scripted fakes.

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model identifier; adapters fall back to their configured default.
    pub model: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// JSON schema the response is expected to satisfy. Adapters that
    /// support structured output forward it; others rely on the prompt.
    pub schema: Option<Value>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            temperature: 1.0,
            max_tokens: None,
            schema: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Raw completion text from the model.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}
