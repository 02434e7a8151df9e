//! Aura Oracle - generative content gateway
//!
//! Wraps a text-generation backend and an image-synthesis URL service
//! behind four operations that never fail:
//!
//! - [`Oracle::generate_symbolic_portrait`]: portrait URL from a vibe
//! - [`Oracle::generate_pulse_visual`]: visual URL from a manifest and mood
//! - [`Oracle::poetize_content`]: rewrite text into a short manifest
//! - [`Oracle::analyze_intention`]: mood, energy, frequency and color
//!
//! plus [`Oracle::echo`], a short reply to someone else's pulse.
//!
//! Each has a fixed fallback used when no backend is configured or the
//! call fails.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │          Oracle          │
//! │ (prompts + fallbacks)    │
//! └────────────┬─────────────┘
//!              │ Option<Arc<dyn LlmBackend>>
//!    ┌─────────┼──────────┐
//!    ▼         ▼          ▼
//! ┌──────┐ ┌──────┐  ┌──────┐
//! │Gemini│ │OpenAI│  │ Mock │
//! └──────┘ └──────┘  └──────┘
//! ```

pub mod backend;
pub mod image;
pub mod oracle;
pub mod prompt;

pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{GeminiBackend, MockBackend, OpenAiBackend};
pub use oracle::{Echo, Oracle, OracleConfig};
