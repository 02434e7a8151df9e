//! Construction of the store and oracle from configuration.
//!
//! Missing or broken credentials never stop startup; the affected
//! collaborator runs offline instead.

use std::sync::Arc;

use aura_oracle::{GeminiBackend, LlmBackend, OpenAiBackend, Oracle};
use aura_store::{MongoStore, PersistenceGateway};
use tracing::{info, warn};

use crate::config::{Args, OracleArgs};

/// Connect to MongoDB when configured.
pub async fn build_gateway(args: &Args) -> PersistenceGateway {
    let Some(uri) = &args.mongodb_uri else {
        info!("MONGODB_URI not set, running without persistence");
        return PersistenceGateway::offline();
    };
    match MongoStore::connect(uri, &args.mongodb_db).await {
        Ok(store) => {
            info!(db = %args.mongodb_db, "Persistence enabled");
            PersistenceGateway::new(Arc::new(store))
        }
        Err(e) => {
            warn!("MongoDB unavailable, running without persistence: {}", e);
            PersistenceGateway::offline()
        }
    }
}

/// Pick a text backend (Gemini, then OpenAI-compatible) and keep it
/// only if it answers a health check.
pub async fn build_oracle(args: &OracleArgs) -> Oracle {
    oracle_for(select_backend(args)).await
}

async fn oracle_for(backend: Option<Arc<dyn LlmBackend>>) -> Oracle {
    let Some(backend) = backend else {
        info!("No generative backend configured, using fallbacks");
        return Oracle::offline();
    };
    match backend.health_check().await {
        Ok(()) => {
            info!(backend = backend.id(), "Oracle backend ready");
            Oracle::new(backend)
        }
        Err(e) => {
            warn!(backend = backend.id(), "Oracle backend unreachable, using fallbacks: {}", e);
            Oracle::offline()
        }
    }
}

fn select_backend(args: &OracleArgs) -> Option<Arc<dyn LlmBackend>> {
    if let Some(key) = non_empty(&args.gemini_api_key) {
        match GeminiBackend::new(key, &args.gemini_model, args.timeout()) {
            Ok(backend) => return Some(Arc::new(backend)),
            Err(e) => warn!("Gemini backend unavailable: {}", e),
        }
    }
    if let Some(key) = non_empty(&args.openai_api_key) {
        match OpenAiBackend::new(
            &args.openai_base_url,
            &args.openai_model,
            Some(key.to_string()),
            args.timeout(),
        ) {
            Ok(backend) => return Some(Arc::new(backend)),
            Err(e) => warn!("OpenAI backend unavailable: {}", e),
        }
    }
    None
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
