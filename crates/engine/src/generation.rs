//! Generation service: prompt in, validated decision out.
//!
//! Wraps the LLM port with the retry policy every player decision relies on:
//! each attempt re-sends the prompt at a slightly higher temperature, the raw
//! response is parsed as JSON and validated against the action's allowed
//! values, and the caller always receives an audit log - even when every
//! attempt failed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::infrastructure::ports::{LlmPort, LlmRequest};

/// How much each failed attempt raises the sampling temperature, and the cap.
const TEMPERATURE_STEP: f32 = 0.2;
const TEMPERATURE_CAP: f32 = 1.0;

/// Retry behavior for decision generation.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Attempts before a decision is declared failed.
    pub retries: u32,
    /// Base delay before a retry; doubles per attempt.
    pub base_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay_ms: 250,
        }
    }
}

/// One request for a structured decision.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    /// Schema echoed to the adapter for structured output.
    pub schema: Value,
    pub temperature: f32,
    /// When present, the extracted result must be one of these strings.
    pub allowed_values: Option<Vec<String>>,
    /// When present, the result is this key's value rather than the whole
    /// response object.
    pub result_key: Option<&'static str>,
}

/// Audit record of a single decision: the rendered prompt, the raw model
/// text, and the parsed response object (None when parsing never succeeded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LmLog {
    pub prompt: String,
    pub raw_resp: String,
    pub result: Option<Value>,
}

/// Runs a decision request against the model with retries.
///
/// Returns `(Some(value), log)` on the first attempt that yields a parseable
/// response passing validation. After the retry budget is exhausted, returns
/// `(None, log)` with all raw responses joined for debugging; callers must
/// treat that as a failure, never as a valid "no-op" choice.
pub async fn generate(
    llm: &dyn LlmPort,
    request: GenerationRequest,
    config: &GenerationConfig,
) -> (Option<Value>, LmLog) {
    let mut temperature = request.temperature;
    let mut raw_responses: Vec<String> = Vec::new();

    for attempt in 0..config.retries {
        if attempt > 0 {
            let delay = config
                .base_delay_ms
                .saturating_mul(2u64.saturating_pow(attempt - 1));
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let llm_request = LlmRequest::new(request.prompt.clone())
            .with_model(request.model.clone())
            .with_temperature(temperature)
            .with_schema(request.schema.clone());

        match llm.generate(llm_request).await {
            Ok(response) => {
                raw_responses.push(response.text.clone());
                if let Some(result) = parse_json(&response.text) {
                    let log = LmLog {
                        prompt: request.prompt.clone(),
                        raw_resp: response.text,
                        result: Some(result.clone()),
                    };
                    let extracted = match request.result_key {
                        Some(key) => result.get(key).cloned(),
                        None => Some(result),
                    };
                    if let Some(extracted) = extracted {
                        if is_allowed(&extracted, request.allowed_values.as_deref()) {
                            return (Some(extracted), log);
                        }
                    }
                    tracing::warn!(
                        attempt,
                        model = %request.model,
                        "response failed validation, retrying"
                    );
                } else {
                    tracing::warn!(attempt, model = %request.model, "unparseable response, retrying");
                }
            }
            Err(e) => {
                tracing::warn!(attempt, model = %request.model, error = %e, "retrying after LLM error");
            }
        }

        temperature = (temperature + TEMPERATURE_STEP).min(TEMPERATURE_CAP);
    }

    (
        None,
        LmLog {
            prompt: request.prompt,
            raw_resp: raw_responses.join("-------"),
            result: None,
        },
    )
}

/// Pulls the first JSON object out of a model response, tolerating code
/// fences and surrounding prose.
fn parse_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn is_allowed(value: &Value, allowed: Option<&[String]>) -> bool {
    match allowed {
        None => true,
        Some(values) => value
            .as_str()
            .is_some_and(|s| values.iter().any(|v| v == s)),
    }
}
