use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

/// Vision model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_vision_model")]
    pub model: String,
    /// Falls back to the `WASTESNAP_API_KEY` or `GEMINI_API_KEY` environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in humantime format, e.g. "60s"
    #[serde(default = "default_vision_timeout")]
    pub timeout: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of remembered analyses
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub backend: CacheBackend,
    /// Directory used by the file backend
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_max_upload_size() -> usize {
    DEFAULT_MAX_UPLOAD_SIZE
}
fn default_vision_endpoint() -> String {
    DEFAULT_VISION_ENDPOINT.to_string()
}
fn default_vision_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}
fn default_vision_timeout() -> String {
    DEFAULT_VISION_TIMEOUT.to_string()
}
fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}
fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}
fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            vision: VisionConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_vision_endpoint(),
            model: default_vision_model(),
            api_key: None,
            timeout: default_vision_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            storage_key: default_storage_key(),
            backend: CacheBackend::default(),
            path: default_cache_path(),
        }
    }
}

impl VisionConfig {
    pub fn timeout_duration(&self) -> AppResult<Duration> {
        humantime::parse_duration(&self.timeout).map_err(|e| {
            AppError::configuration(format!("invalid vision.timeout '{}': {}", self.timeout, e))
        })
    }

    /// API key from the config file, otherwise from the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|name| std::env::var(name).ok())
                    .find(|key| !key.trim().is_empty())
            })
    }
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config: Config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.cache.capacity == 0 {
            return Err(AppError::configuration("cache.capacity must be at least 1"));
        }
        if self.cache.storage_key.trim().is_empty() {
            return Err(AppError::configuration("cache.storage_key must not be empty"));
        }
        if self.web.max_upload_size == 0 {
            return Err(AppError::configuration("web.max_upload_size must be positive"));
        }
        self.vision.timeout_duration()?;
        Ok(())
    }
}
