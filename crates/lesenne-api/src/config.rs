use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub llm: LlmSection,
    pub memory: MemoryConfig,
    pub pipeline: PipelineSection,
    pub retrieval: RetrievalConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

/// Persistence backend, resolved once at startup. No runtime probing: an
/// instance either runs on the in-process store or on MongoDB for its whole
/// lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// "memory" or "mongodb"
    pub backend: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    pub model: String,
    pub temperature: f32,
    /// Completion cap sent to the model, not the history budget
    pub max_tokens: u32,
    /// OpenAI-compatible endpoint override
    #[serde(default)]
    pub base_url: Option<String>,
}

impl From<LlmSection> for lesenne_types::LlmConfig {
    fn from(section: LlmSection) -> Self {
        Self {
            model: section.model,
            temperature: Some(section.temperature),
            max_tokens: Some(section.max_tokens),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Token budget for the per-thread conversation window
    pub max_tokens: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    pub top_k: usize,
    pub contextualize_window: usize,
}

impl From<PipelineSection> for lesenne_types::PipelineConfig {
    fn from(section: PipelineSection) -> Self {
        Self {
            top_k: section.top_k,
            contextualize_window: section.contextualize_window,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Vector-search service endpoint
    pub endpoint: String,
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
    /// 3. Environment variables (with SERVER_, STORAGE_, LLM_, etc. prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .prefix("SERVER")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("STORAGE")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("LLM")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("MEMORY")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("PIPELINE")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("RETRIEVAL")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("LOG")
                    .separator("_")
                    .try_parsing(true),
            );

        let config = builder.build()?;

        let mut cfg: Config = config.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok();

        if cfg.storage.backend == "mongodb" && cfg.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required when storage.backend is \"mongodb\""
                    .to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}
