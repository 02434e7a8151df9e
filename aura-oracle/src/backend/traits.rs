//! The seam between the oracle and a text-generation service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Why a backend call produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Not configured, unreachable, or switched off
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Non-success HTTP status other than 429
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// Generation hit the token cap mid-sentence
    #[error("Response cut off at the token limit")]
    Truncated,
}

/// A text-generation service the oracle can ask.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Model name, used in logs.
    fn id(&self) -> &str;

    /// Cheap authenticated request confirming the service and model
    /// answer. Run once at startup to decide between this backend and
    /// the offline fallbacks.
    async fn health_check(&self) -> Result<(), LlmError>;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// One single-turn prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    /// Sampling temperature, `0.0..=2.0`
    pub temperature: Option<f32>,
    /// Ask the service for a bare JSON object
    pub json_output: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Text returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    /// Generation stopped on the token cap rather than on its own
    pub truncated: bool,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            truncated: false,
        }
    }

    pub fn cut_off(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            truncated: true,
        }
    }

    /// The text, or [`LlmError::Truncated`] when it was cut off.
    pub fn into_complete(self) -> Result<String, LlmError> {
        if self.truncated {
            Err(LlmError::Truncated)
        } else {
            Ok(self.content)
        }
    }
}
