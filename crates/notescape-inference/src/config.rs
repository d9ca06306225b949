//! Inference configuration.
//!
//! Configuration is resolved once by the caller and handed to
//! [`ProviderResolver`](crate::resolver::ProviderResolver). It can be loaded from:
//! - TOML files (default: ~/.config/notescape/inference.toml)
//! - Environment variables (NOTESCAPE_* prefixed, plus `OPENAI_API_KEY`)
//!
//! # Example
//!
//! ```rust,no_run
//! use notescape_inference::config::InferenceConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = InferenceConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = InferenceConfig::from_file(std::path::Path::new("inference.toml")).expect("Failed to load");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use notescape_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for notescape_core::Error {
    fn from(e: ConfigError) -> Self {
        notescape_core::Error::Config(e.to_string())
    }
}

/// Concrete embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// OpenAI-compatible remote API.
    OpenAI,
    /// Local Ollama instance.
    Ollama,
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Which embedding provider the caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingPreference {
    /// Remote if a credential is present, otherwise local.
    #[default]
    Auto,
    OpenAI,
    Ollama,
    /// No embeddings; analysis uses keyword overlap only.
    Disabled,
}

impl FromStr for EmbeddingPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "openai" => Ok(Self::OpenAI),
            "ollama" | "local" => Ok(Self::Ollama),
            "none" | "disabled" | "off" => Ok(Self::Disabled),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

/// Entity extraction backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NerProviderKind {
    /// Capitalized-span rules, no model required.
    #[default]
    Rules,
    /// GLiNER HTTP sidecar.
    Gliner,
}

impl FromStr for NerProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" | "rule" => Ok(Self::Rules),
            "gliner" => Ok(Self::Gliner),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

impl fmt::Display for NerProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Gliner => write!(f, "gliner"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_embed_timeout() -> u64 {
    defaults::EMBED_TIMEOUT_SECS
}

fn default_ner_timeout() -> u64 {
    defaults::NER_TIMEOUT_SECS
}

fn default_openai_batch() -> usize {
    defaults::OPENAI_EMBED_BATCH_SIZE
}

fn validate_url(label: &str, url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} base_url cannot be empty",
            label
        )));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{} base_url must start with http:// or https://, got: {}",
            label, url
        )));
    }
    Ok(())
}

/// Ollama (local) embedding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Whether the local provider may be selected.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL for Ollama API.
    pub base_url: String,
    /// Model to use for embeddings.
    pub embedding_model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: defaults::OLLAMA_URL.to_string(),
            embedding_model: defaults::EMBED_MODEL.to_string(),
            dimension: defaults::EMBED_DIMENSION,
            timeout_secs: defaults::EMBED_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("Ollama", &self.base_url)?;
        if self.embedding_model.is_empty() {
            return Err(ConfigError::Validation(
                "Ollama embedding_model cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// OpenAI-compatible (remote) embedding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Base URL for OpenAI-compatible API.
    pub base_url: String,
    /// API key. The remote provider is only eligible when this is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub embedding_model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Texts per embeddings request.
    #[serde(default = "default_openai_batch")]
    pub batch_size: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_URL.to_string(),
            api_key: None,
            embedding_model: defaults::OPENAI_EMBED_MODEL.to_string(),
            dimension: defaults::OPENAI_EMBED_DIMENSION,
            batch_size: defaults::OPENAI_EMBED_BATCH_SIZE,
            timeout_secs: defaults::EMBED_TIMEOUT_SECS,
        }
    }
}

impl OpenAIConfig {
    /// True when a non-blank API key is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_url("OpenAI", &self.base_url)?;
        if self.embedding_model.is_empty() {
            return Err(ConfigError::Validation(
                "OpenAI embedding_model cannot be empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "OpenAI batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// GLiNER sidecar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlinerConfig {
    pub base_url: String,
    /// Minimum confidence for returned entities.
    #[serde(default)]
    pub threshold: Option<f32>,
    /// Entity labels to request. Empty means the built-in default set.
    #[serde(default)]
    pub entity_types: Vec<String>,
    #[serde(default = "default_ner_timeout")]
    pub timeout_secs: u64,
}

/// Entity extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NerConfig {
    #[serde(default)]
    pub provider: NerProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gliner: Option<GlinerConfig>,
}

/// Main inference configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Embedding provider preference.
    #[serde(default)]
    pub embedding: EmbeddingPreference,
    /// Ollama configuration (local).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<OllamaConfig>,
    /// OpenAI configuration (remote).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAIConfig>,
    /// Entity extraction backend.
    #[serde(default)]
    pub ner: NerConfig,
}

impl InferenceConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/notescape/inference.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("notescape");
        path.push("inference.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading inference config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Self::from_env()
        }
    }

    /// Load configuration from a TOML file with an `[inference]` table.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            inference: InferenceConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        root.inference.validate()?;
        Ok(root.inference)
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | NOTESCAPE_EMBEDDING_PROVIDER | auto |
    /// | OPENAI_API_KEY / NOTESCAPE_OPENAI_API_KEY | (none) |
    /// | NOTESCAPE_OPENAI_URL | https://api.openai.com/v1 |
    /// | NOTESCAPE_OPENAI_EMBED_MODEL | text-embedding-3-small |
    /// | NOTESCAPE_OPENAI_EMBED_DIM | 1536 |
    /// | NOTESCAPE_OLLAMA_ENABLED | true |
    /// | NOTESCAPE_OLLAMA_URL | http://127.0.0.1:11434 |
    /// | NOTESCAPE_OLLAMA_EMBED_MODEL | nomic-embed-text |
    /// | NOTESCAPE_OLLAMA_EMBED_DIM | 768 |
    /// | NOTESCAPE_EMBED_TIMEOUT_SECS | 30 |
    /// | NOTESCAPE_NER_PROVIDER | rules |
    /// | GLINER_BASE_URL | (none) |
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let embedding = match lookup("NOTESCAPE_EMBEDDING_PROVIDER") {
            Some(value) => value.parse()?,
            None => EmbeddingPreference::Auto,
        };

        let timeout_secs = lookup("NOTESCAPE_EMBED_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::EMBED_TIMEOUT_SECS);

        let openai = OpenAIConfig {
            base_url: lookup("NOTESCAPE_OPENAI_URL")
                .unwrap_or_else(|| defaults::OPENAI_URL.to_string()),
            api_key: lookup("NOTESCAPE_OPENAI_API_KEY").or_else(|| lookup("OPENAI_API_KEY")),
            embedding_model: lookup("NOTESCAPE_OPENAI_EMBED_MODEL")
                .unwrap_or_else(|| defaults::OPENAI_EMBED_MODEL.to_string()),
            dimension: lookup("NOTESCAPE_OPENAI_EMBED_DIM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::OPENAI_EMBED_DIMENSION),
            batch_size: defaults::OPENAI_EMBED_BATCH_SIZE,
            timeout_secs,
        };

        let ollama = OllamaConfig {
            enabled: lookup("NOTESCAPE_OLLAMA_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            base_url: lookup("NOTESCAPE_OLLAMA_URL")
                .unwrap_or_else(|| defaults::OLLAMA_URL.to_string()),
            embedding_model: lookup("NOTESCAPE_OLLAMA_EMBED_MODEL")
                .unwrap_or_else(|| defaults::EMBED_MODEL.to_string()),
            dimension: lookup("NOTESCAPE_OLLAMA_EMBED_DIM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::EMBED_DIMENSION),
            timeout_secs,
        };

        let gliner = lookup(defaults::ENV_GLINER_BASE_URL)
            .filter(|url| !url.is_empty())
            .map(|base_url| GlinerConfig {
                base_url,
                threshold: Some(defaults::GLINER_THRESHOLD),
                entity_types: Vec::new(),
                timeout_secs: defaults::NER_TIMEOUT_SECS,
            });

        let ner = NerConfig {
            provider: match lookup("NOTESCAPE_NER_PROVIDER") {
                Some(value) => value.parse()?,
                None => NerProviderKind::Rules,
            },
            gliner,
        };

        let config = Self {
            embedding,
            ollama: Some(ollama),
            openai: Some(openai),
            ner,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(ref ollama) = self.ollama {
            ollama.validate()?;
        }

        if let Some(ref openai) = self.openai {
            openai.validate()?;
        }

        match self.embedding {
            EmbeddingPreference::OpenAI if self.openai.is_none() => {
                return Err(ConfigError::Validation(
                    "OpenAI is the preferred embedding provider but not configured".to_string(),
                ));
            }
            EmbeddingPreference::Ollama if self.ollama.is_none() => {
                return Err(ConfigError::Validation(
                    "Ollama is the preferred embedding provider but not configured".to_string(),
                ));
            }
            _ => {}
        }

        if self.ner.provider == NerProviderKind::Gliner {
            match self.ner.gliner {
                Some(ref gliner) => validate_url("GLiNER", &gliner.base_url)?,
                None => {
                    return Err(ConfigError::Validation(
                        "GLiNER selected for entity extraction but not configured".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        let re = match regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}
