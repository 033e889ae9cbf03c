//! Configuration for the floorplan extractor.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{FloorplanError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Supported vision-model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
    OpenRouter,
}

impl Provider {
    /// Default vision-capable model for the provider.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini/gemini-3-pro-preview",
            Provider::OpenAi => "openai/gpt-4o",
            Provider::OpenRouter => "openrouter/google/gemini-2.5-flash",
        }
    }

    /// Default OpenAI-compatible API base for the provider.
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = FloorplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(FloorplanError::InvalidConfig(format!(
                "unknown provider '{}', expected gemini, openai or openrouter",
                other
            ))),
        }
    }
}

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider, used for default model and API base.
    #[serde(default)]
    pub provider: Provider,

    /// Base URL for the OpenAI-compatible API. Empty means provider default.
    #[serde(default)]
    pub api_base: String,

    /// API key for authentication
    #[serde(default)]
    pub api_key: String,

    /// Model name. Empty means provider default.
    #[serde(default)]
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_base: String::new(),
            api_key: String::new(),
            model: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// Explicit model, or the provider's default.
    pub fn resolved_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    /// Model name as sent on the wire, without the `<provider>/` routing prefix.
    pub fn api_model(&self) -> &str {
        let model = self.resolved_model();
        let prefix = self.provider.as_str();
        model
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(model)
    }

    /// Explicit API base, or the provider's default.
    pub fn resolved_api_base(&self) -> &str {
        if self.api_base.is_empty() {
            self.provider.default_api_base()
        } else {
            &self.api_base
        }
    }
}

/// Layout of the CubiCasa5K dataset on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset root; split manifests live at `<root>/<split>.txt`.
    pub root: PathBuf,

    /// Image file name inside each sample directory.
    #[serde(default = "default_image_file")]
    pub image_file: String,

    /// Annotation file name inside each sample directory.
    #[serde(default = "default_annotation_file")]
    pub annotation_file: String,
}

fn default_image_file() -> String {
    "F1_original.png".to_string()
}

fn default_annotation_file() -> String {
    "model.svg".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/cubicasa5k/cubicasa5k"),
            image_file: default_image_file(),
            annotation_file: default_annotation_file(),
        }
    }
}

impl DatasetConfig {
    /// Dataset config rooted at `root` with the standard file names.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Dataset layout
    pub dataset: DatasetConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    dataset: Option<DatasetFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    provider: Option<String>,
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct DatasetFileSection {
    root: Option<PathBuf>,
    image_file: Option<String>,
    annotation_file: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_PROVIDER, LLM_API_BASE, LLM_API_KEY, LLM_MODEL, FLOORPLAN_DATA_DIR)
    /// 2. Config file (~/.config/floorplan-extractor/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        if let Ok(provider) = env::var("LLM_PROVIDER") {
            config.llm.provider = provider.parse()?;
        }

        if let Ok(api_base) = env::var("LLM_API_BASE") {
            config.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY") {
            config.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(max_tokens) = env::var("LLM_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                config.llm.max_tokens = tokens;
            }
        }

        if let Ok(temperature) = env::var("LLM_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                config.llm.temperature = temp;
            }
        }

        if let Ok(root) = env::var("FLOORPLAN_DATA_DIR") {
            config.dataset.root = PathBuf::from(root);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FloorplanError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling gaps with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| FloorplanError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(provider) = llm.provider {
                config.llm.provider = provider.parse()?;
            }
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(dataset) = file_config.dataset {
            if let Some(root) = dataset.root {
                config.dataset.root = root;
            }
            if let Some(image_file) = dataset.image_file {
                config.dataset.image_file = image_file;
            }
            if let Some(annotation_file) = dataset.annotation_file {
                config.dataset.annotation_file = annotation_file;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "floorplan-extractor")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required LLM configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.resolved_api_base().is_empty() {
            return Err(FloorplanError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(FloorplanError::Config(
                "LLM API key is required. Set LLM_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.resolved_model().is_empty() {
            return Err(FloorplanError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            dataset: DatasetConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, Provider::Gemini);
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.llm.resolved_model(), "gemini/gemini-3-pro-preview");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(
            config.dataset.root,
            PathBuf::from("data/cubicasa5k/cubicasa5k")
        );
        assert_eq!(config.dataset.image_file, "F1_original.png");
        assert_eq!(config.dataset.annotation_file, "model.svg");
    }

    #[test]
    fn test_validate_fails_without_api_key() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_llm() {
        let config = Config::with_llm("https://api.example.com", "test-key", "gpt-4o");
        assert_eq!(config.llm.resolved_api_base(), "https://api.example.com");
        assert_eq!(config.llm.resolved_model(), "gpt-4o");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_defaults() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(Provider::OpenAi.default_model(), "openai/gpt-4o");
        assert_eq!(
            Provider::OpenRouter.default_model(),
            "openrouter/google/gemini-2.5-flash"
        );
        assert!("anthropic".parse::<Provider>().is_err());
    }

    #[test]
    fn test_api_model_strips_provider_prefix() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.api_model(), "gemini-3-pro-preview");

        llm.provider = Provider::OpenRouter;
        assert_eq!(llm.api_model(), "google/gemini-2.5-flash");

        llm.model = "gpt-4o-mini".to_string();
        assert_eq!(llm.api_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
llm:
  provider: openrouter
  api_key: secret
  temperature: 1.0
dataset:
  root: /data/cubicasa
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.llm.provider, Provider::OpenRouter);
        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.llm.temperature, 1.0);
        assert_eq!(config.llm.resolved_api_base(), "https://openrouter.ai/api/v1");
        assert_eq!(config.dataset.root, PathBuf::from("/data/cubicasa"));
        assert_eq!(config.dataset.annotation_file, "model.svg");
    }

    #[test]
    fn test_from_yaml_rejects_unknown_provider() {
        let yaml = "llm:\n  provider: nope\n";
        assert!(Config::from_yaml(yaml).is_err());
    }
}
