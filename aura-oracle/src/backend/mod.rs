//! Text-generation backends.
//!
//! - Gemini (Google Generative Language API)
//! - OpenAI-compatible chat completions
//! - Mock backend for testing

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

/// HTTP client with a whole-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Unavailable(format!("HTTP client: {}", e)))
}

/// Pass 2xx responses through; map the rest to an [`LlmError`] carrying
/// the body.
pub(crate) async fn reject_failure(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)))
}
