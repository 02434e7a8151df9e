//! Chat-completions backend for OpenAI and servers speaking its dialect
//! (vLLM, Ollama, LocalAI).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::traits::*;
use super::{http_client, reject_failure};

pub struct OpenAiBackend {
    client: Client,
    /// Endpoint root ending in `/v1`, without a trailing slash
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<Turn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonMode>,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Reply,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    content: Option<String>,
}

impl<'a> ChatBody<'a> {
    fn from_request(model: &'a str, request: &'a CompletionRequest) -> Self {
        let system = request.system.as_deref().map(|content| Turn {
            role: "system",
            content,
        });
        let user = Turn {
            role: "user",
            content: &request.prompt,
        };
        Self {
            model,
            messages: system.into_iter().chain(std::iter::once(user)).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_output.then_some(JsonMode {
                kind: "json_object",
            }),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;
        reject_failure(response).await.map(|_| ())
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = ChatBody::from_request(&self.model, &request);
        let response = self
            .authorized(self.client.post(format!("{}/chat/completions", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let reply: ChatReply = reject_failure(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let Some(choice) = reply.choices.into_iter().next() else {
            return Err(LlmError::ParseError("reply carried no choices".to_string()));
        };
        let content = choice.message.content.unwrap_or_default();
        Ok(match choice.finish_reason.as_deref() {
            Some("length") => CompletionResponse::cut_off(content),
            _ => CompletionResponse::new(content),
        })
    }
}
