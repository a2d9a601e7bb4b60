use config::{Config as ConfigLoader, ConfigError, Environment, File};
use obox_chat::ChatConfig;
use obox_llm::{AnimationConfig, GeminiConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub animation: AnimationSettings,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub gemini_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    /// Initial state of the search toggle
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Empty means the public Gemini endpoint
    #[serde(default)]
    pub base_url: String,
    pub model: String,
    pub reasoning_model: String,
    /// Initial state of the reasoning toggle
    pub reasoning: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationSettings {
    pub frame_interval_ms: u64,
    pub reveal_divisor: usize,
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding all local state; empty keeps everything in memory
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. OBOX_* environment variables, `__` between levels (OBOX_LLM__MODEL)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("OBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        config.try_deserialize()
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: Some(self.llm.base_url.clone()).filter(|url| !url.is_empty()),
        }
    }

    pub fn chat(&self) -> ChatConfig {
        ChatConfig::default()
            .with_models(&self.llm.model, &self.llm.reasoning_model)
            .with_animation(self.animation.clone().into())
    }
}

impl From<AnimationSettings> for AnimationConfig {
    fn from(settings: AnimationSettings) -> Self {
        AnimationConfig::default()
            .frame_interval(Duration::from_millis(settings.frame_interval_ms.max(1)))
            .reveal_divisor(settings.reveal_divisor)
            .settle(Duration::from_millis(settings.settle_ms))
    }
}
