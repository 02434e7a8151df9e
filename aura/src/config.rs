//! Configuration for the Aura shell
//!
//! CLI arguments and environment variable handling using clap.

use std::path::PathBuf;
use std::time::Duration;

use aura_oracle::backend::gemini::GEMINI_DEFAULT_MODEL;
use clap::{Parser, ValueEnum};
use nebula::{NebulaConfig, Viewport};
use thiserror::Error;

/// Aura - a social nebula of daily pulses
#[derive(Parser, Debug, Clone)]
#[command(name = "aura")]
#[command(about = "Renders the Aura nebula headlessly and writes an SVG snapshot")]
pub struct Args {
    /// MongoDB connection URI; without it nothing is persisted
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "AuraDB")]
    pub mongodb_db: String,

    /// Generative backend configuration
    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Startup load timeout before falling back to demo identities
    #[arg(long, env = "LOAD_TIMEOUT_MS", default_value = "5000")]
    pub load_timeout_ms: u64,

    /// Placeholder identities generated on fallback
    #[arg(long, env = "BOT_COUNT", default_value = "12")]
    pub bot_count: usize,

    /// Canvas width in pixels
    #[arg(long, env = "WIDTH", default_value = "1280")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, env = "HEIGHT", default_value = "720")]
    pub height: u32,

    /// Frames to simulate before the snapshot
    #[arg(long, env = "FRAMES", default_value = "240")]
    pub frames: u64,

    /// Frames per second of the render loop
    #[arg(long, env = "FPS", default_value = "60")]
    pub fps: u32,

    /// Where to write the final frame as SVG
    #[arg(long, env = "SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Log in as this member (case-insensitive); defaults to the first
    #[arg(long, env = "LOGIN")]
    pub login: Option<String>,

    /// Click this member's node after the last frame
    #[arg(long, env = "SELECT")]
    pub select: Option<String>,

    /// Per-portrait fetch timeout; portraits still loading when the
    /// last frame is drawn stay as gradients
    #[arg(long, env = "PORTRAIT_TIMEOUT_MS", default_value = "10000")]
    pub portrait_timeout_ms: u64,

    /// Seed for stars, clouds and node placement
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// YAML file with engine tuning
    #[arg(long, env = "NEBULA_CONFIG")]
    pub nebula_config: Option<PathBuf>,
}

/// Generative backend selection. Gemini wins when both keys are set.
#[derive(clap::Args, Debug, Clone)]
pub struct OracleArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Gemini model
    #[arg(long, env = "GEMINI_MODEL", default_value = GEMINI_DEFAULT_MODEL)]
    pub gemini_model: String,

    /// OpenAI-compatible endpoint (ending in /v1)
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// OpenAI-compatible API key
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible model
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "ORACLE_TIMEOUT_MS", default_value = "30000")]
    pub timeout_ms: u64,
}

impl OracleArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WIDTH and HEIGHT must be greater than zero (got {0}x{1})")]
    EmptyViewport(u32, u32),

    #[error("FPS must be greater than zero")]
    ZeroFps,

    #[error("MONGODB_DB must not be empty")]
    EmptyDatabase,

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid nebula config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyViewport(self.width, self.height));
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.mongodb_uri.is_some() && self.mongodb_db.trim().is_empty() {
            return Err(ConfigError::EmptyDatabase);
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn portrait_timeout(&self) -> Duration {
        Duration::from_millis(self.portrait_timeout_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32)
    }

    /// Engine config from `--nebula-config`, with `--seed` applied on top.
    pub fn nebula_config(&self) -> Result<NebulaConfig, ConfigError> {
        let mut config = match &self.nebula_config {
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                NebulaConfig::from_yaml(&yaml)?
            }
            None => NebulaConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.scene.seed = seed;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["aura"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.mongodb_db, "AuraDB");
        assert_eq!(args.load_timeout(), Duration::from_secs(5));
        assert_eq!(args.bot_count, 12);
        assert_eq!(args.viewport(), Viewport::new(1280.0, 720.0));
        assert_eq!(args.log_format, LogFormat::Text);
        assert_eq!(args.portrait_timeout(), Duration::from_secs(10));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let args = parse(&["--width", "0"]);
        assert!(matches!(args.validate(), Err(ConfigError::EmptyViewport(0, 720))));
        let args = parse(&["--fps", "0"]);
        assert!(matches!(args.validate(), Err(ConfigError::ZeroFps)));
    }

    #[test]
    fn test_seed_overrides_nebula_config() {
        let args = parse(&["--seed", "42"]);
        assert_eq!(args.nebula_config().unwrap().scene.seed, 42);
    }

    #[test]
    fn test_missing_nebula_config_file() {
        let args = parse(&["--nebula-config", "/nonexistent/nebula.yaml"]);
        assert!(matches!(args.nebula_config(), Err(ConfigError::Read { .. })));
    }
}
