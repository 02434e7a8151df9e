//! The oracle service - prompts plus fallbacks around an optional backend.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use aura_core::{now_millis, Intention};

use crate::backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
use crate::image::{self, DEFAULT_IMAGE_BASE};
use crate::prompt::{clean_response, PromptAssembler};

/// Tuning for the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Prompt-in-URL image service
    pub image_base_url: String,
    /// Token cap for manifests and echoes
    pub max_tokens: u32,
    /// Sampling temperature for manifests
    pub temperature: f32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            image_base_url: DEFAULT_IMAGE_BASE.to_string(),
            max_tokens: 256,
            temperature: 0.9,
        }
    }
}

/// A short reply to someone's pulse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub text: String,
    pub source: String,
}

impl Default for Echo {
    fn default() -> Self {
        Self {
            text: "O silêncio também responde.".to_string(),
            source: "Aura".to_string(),
        }
    }
}

/// Generative content gateway. Every operation returns a usable value.
#[derive(Clone, Default)]
pub struct Oracle {
    backend: Option<Arc<dyn LlmBackend>>,
    config: OracleConfig,
}

impl Oracle {
    /// Oracle over a text backend.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend: Some(backend),
            config: OracleConfig::default(),
        }
    }

    /// Oracle with no text backend: manifests and analysis use fallbacks.
    pub fn offline() -> Self {
        Self::default()
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: OracleConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether a text backend is configured.
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Portrait URL for a member described by `traits`.
    pub fn generate_symbolic_portrait(&self, traits: &str) -> String {
        let seed = rand::thread_rng().gen_range(0..1_000_000);
        let prompt = if traits.trim().is_empty() {
            String::new()
        } else {
            PromptAssembler::portrait(traits)
        };
        match image::synthesis_url(&self.config.image_base_url, &prompt, seed, 1024, 1024) {
            Ok(url) => url,
            Err(e) => {
                warn!("Portrait generation failed: {}", e);
                image::portrait_placeholder(traits)
            }
        }
    }

    /// Visual URL for a pulse.
    pub fn generate_pulse_visual(&self, content: &str, mood: &str) -> String {
        let seed = rand::thread_rng().gen_range(0..1_000_000);
        let prompt = if content.trim().is_empty() {
            String::new()
        } else {
            PromptAssembler::pulse_visual(content, mood)
        };
        match image::synthesis_url(&self.config.image_base_url, &prompt, seed, 1280, 720) {
            Ok(url) => url,
            Err(e) => {
                warn!("Pulse visual generation failed: {}", e);
                image::visual_placeholder(now_millis())
            }
        }
    }

    /// Rewrite `text` as a short manifest; returns `text` unchanged on failure.
    pub async fn poetize_content(&self, text: &str) -> String {
        let request = CompletionRequest::new(PromptAssembler::poetize(text))
            .with_system(PromptAssembler::system_prompt())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        match self.ask(request).await {
            Ok(raw) => {
                let manifest = clean_response(&raw);
                if manifest.is_empty() {
                    text.to_string()
                } else {
                    manifest
                }
            }
            Err(e) => {
                debug!("Poetize fell back to input: {}", e);
                text.to_string()
            }
        }
    }

    /// Mood, energy, frequency and color of `text`.
    pub async fn analyze_intention(&self, text: &str) -> Intention {
        let request = CompletionRequest::new(PromptAssembler::analyze(text))
            .with_system(PromptAssembler::system_prompt())
            .with_json_output();

        match self.ask_json::<Intention>(request).await {
            Ok(intention) => intention.normalized(),
            Err(e) => {
                debug!("Intention analysis fell back to default: {}", e);
                Intention::default()
            }
        }
    }

    /// A short reply to `content`.
    pub async fn echo(&self, content: &str) -> Echo {
        let request = CompletionRequest::new(PromptAssembler::echo(content))
            .with_system(PromptAssembler::system_prompt())
            .with_max_tokens(self.config.max_tokens)
            .with_json_output();

        match self.ask_json::<Echo>(request).await {
            Ok(echo) if !echo.text.trim().is_empty() => echo,
            Ok(_) => Echo::default(),
            Err(e) => {
                debug!("Echo fell back to default: {}", e);
                Echo::default()
            }
        }
    }

    async fn ask(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| LlmError::Unavailable("no text backend configured".to_string()))?;

        backend
            .complete(request)
            .await
            .and_then(CompletionResponse::into_complete)
            .map_err(|e| {
                warn!(backend = backend.id(), "Oracle request failed: {}", e);
                e
            })
    }

    async fn ask_json<T: serde::de::DeserializeOwned>(
        &self,
        request: CompletionRequest,
    ) -> Result<T, LlmError> {
        let raw = self.ask(request).await?;
        serde_json::from_str(&clean_response(&raw)).map_err(|e| LlmError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn oracle_with(mock: MockBackend) -> (Oracle, Arc<MockBackend>) {
        let mock = Arc::new(mock);
        (Oracle::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_poetize_strips_quotes() {
        let (oracle, mock) = oracle_with(MockBackend::default().with_response("\"O mar canta em mim\""));
        assert_eq!(oracle.poetize_content("sinto o mar").await, "O mar canta em mim");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_poetize_falls_back_to_input() {
        let (oracle, _) = oracle_with(MockBackend::default().with_available(false));
        assert_eq!(oracle.poetize_content("sinto o mar").await, "sinto o mar");

        let (oracle, _) = oracle_with(MockBackend::default().with_response("   "));
        assert_eq!(oracle.poetize_content("sinto o mar").await, "sinto o mar");

        assert_eq!(Oracle::offline().poetize_content("eco").await, "eco");
    }

    #[tokio::test]
    async fn test_cut_off_manifest_keeps_input() {
        let (oracle, mock) = oracle_with(
            MockBackend::default()
                .then_cut_off("O mar canta em")
                .then_respond("O mar canta em mim"),
        );
        assert_eq!(oracle.poetize_content("sinto o mar").await, "sinto o mar");
        assert_eq!(oracle.poetize_content("sinto o mar").await, "O mar canta em mim");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_analyze_parses_fenced_json_and_clamps() {
        let (oracle, _) = oracle_with(MockBackend::default().with_response(
            "```json\n{\"mood\": \"Calma\", \"energy\": 1.7, \"frequency\": 500, \"color\": \"#ff00ff\"}\n```",
        ));
        let intention = oracle.analyze_intention("luz").await;

        assert_eq!(intention.mood, "Calma");
        assert_eq!(intention.energy, 1.0);
        assert_eq!(intention.frequency, 500.0);
        assert_eq!(intention.color, "#ff00ff");
    }

    #[tokio::test]
    async fn test_analyze_fallback_constant() {
        let (oracle, _) = oracle_with(MockBackend::default().with_response("not json"));
        assert_eq!(oracle.analyze_intention("luz").await, Intention::default());
        assert_eq!(Oracle::offline().analyze_intention("luz").await, Intention::default());
    }

    #[tokio::test]
    async fn test_echo() {
        let (oracle, _) = oracle_with(
            MockBackend::default().with_response(r#"{"text": "Tudo volta", "source": "Rumi"}"#),
        );
        let echo = oracle.echo("luz").await;
        assert_eq!(echo.source, "Rumi");

        assert_eq!(Oracle::offline().echo("luz").await, Echo::default());
    }

    #[test]
    fn test_portrait_url_and_fallback() {
        let oracle = Oracle::offline();
        assert!(oracle
            .generate_symbolic_portrait("silent weaver")
            .starts_with(DEFAULT_IMAGE_BASE));
        assert_eq!(
            oracle.generate_symbolic_portrait("  "),
            image::portrait_placeholder("  ")
        );
    }

    #[test]
    fn test_visual_fallback_on_bad_base() {
        let oracle = Oracle::offline().with_config(OracleConfig {
            image_base_url: "nowhere".to_string(),
            ..Default::default()
        });
        assert!(oracle
            .generate_pulse_visual("luz", "Calma")
            .starts_with("https://picsum.photos/seed/pulse-"));
    }
}
