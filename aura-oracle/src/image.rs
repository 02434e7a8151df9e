//! Image URL synthesis.
//!
//! Images are produced by a prompt-in-URL service: the URL itself is the
//! request, fetched lazily by whoever displays it.

use reqwest::Url;
use sha2::{Digest, Sha256};

/// Prompt-in-URL image service.
pub const DEFAULT_IMAGE_BASE: &str = "https://image.pollinations.ai/prompt";
/// Placeholder image service used for fallbacks.
pub const PLACEHOLDER_BASE: &str = "https://picsum.photos/seed";

/// Errors building an image URL.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("empty prompt")]
    EmptyPrompt,

    #[error("invalid image URL: {0}")]
    InvalidUrl(String),
}

/// Build a synthesis URL for `prompt` at the given size.
pub fn synthesis_url(
    base: &str,
    prompt: &str,
    seed: u32,
    width: u32,
    height: u32,
) -> Result<String, ImageError> {
    if prompt.trim().is_empty() {
        return Err(ImageError::EmptyPrompt);
    }
    let raw = format!(
        "{}/{}?seed={}&width={}&height={}&nologo=true",
        base.trim_end_matches('/'),
        urlencoding::encode(prompt),
        seed,
        width,
        height
    );
    Url::parse(&raw).map_err(|e| ImageError::InvalidUrl(e.to_string()))?;
    Ok(raw)
}

/// Deterministic placeholder keyed by a hash of `traits`.
pub fn portrait_placeholder(traits: &str) -> String {
    format!("{}/{}/800/800", PLACEHOLDER_BASE, short_hash(traits))
}

/// Placeholder for a pulse visual keyed by time.
pub fn visual_placeholder(millis: i64) -> String {
    format!("{}/pulse-{}/1200/675", PLACEHOLDER_BASE, millis)
}

/// First 8 bytes of SHA-256, hex encoded.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..8])
}
