use config::{Config as ConfigLoader, ConfigError, Environment, File, FileFormat};
use paperqa_llm::{ClientConfig, DEFAULT_API_BASE};
use paperqa_types::Language;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    /// Model to request; the server default when unset
    #[serde(default)]
    pub model: Option<String>,
    /// Language for storyline analysis
    #[serde(default)]
    pub language: Language,
    /// Print the math-normalized answer after streaming it
    #[serde(default)]
    pub render_math: bool,
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
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. PAPERQA_* environment variables, e.g. PAPERQA_API__BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PAPERQA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(self.api.base_url.clone())
            .with_user_agent(concat!("paperqa/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = self.api.connect_timeout_secs {
            client = client.with_connect_timeout(secs);
        }
        client
    }
}

fn with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    ConfigLoader::builder()
        .set_default("api.base_url", DEFAULT_API_BASE)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "pretty")
}
