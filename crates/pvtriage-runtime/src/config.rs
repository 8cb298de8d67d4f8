//! Runtime configuration.
//!
//! Loaded from YAML, then overridden from the environment. Durations are
//! written in human form (`"30s"`, `"500ms"`, `"1h"`).
//!
//! ```yaml
//! provider: gemini
//! model: gemini-2.5-flash
//! timeout: 30s
//! retry:
//!   max_attempts: 3
//!   min_delay: 500ms
//! circuit_breaker:
//!   failure_threshold: 3
//!   recovery_timeout: 30s
//! cache:
//!   max_entries: 1000
//!   ttl: 1h
//! provider_options:
//!   api_key: ...
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::providers::CompletionConfig;
use crate::resilience::CircuitBreakerConfig;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Overrides `provider`.
pub const PROVIDER_ENV: &str = "PVTRIAGE_PROVIDER";
/// Overrides `model`.
pub const MODEL_ENV: &str = "PVTRIAGE_MODEL";
/// Overrides `timeout`, in humantime form.
pub const TIMEOUT_ENV: &str = "PVTRIAGE_TIMEOUT";

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid duration in {var}: '{value}'")]
    InvalidDuration { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde adapter for `humantime` durations.
pub(crate) mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

/// Retry policy for transient provider failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_attempts: usize,

    #[serde(with = "human_duration")]
    pub min_delay: Duration,

    #[serde(with = "human_duration")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Extraction result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: u64,
    #[serde(with = "human_duration")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Configuration for the extraction runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Registered provider type, e.g. "gemini"
    pub provider: String,

    pub model: String,

    pub max_tokens: u32,

    /// 0.0 keeps extraction as repeatable as the provider allows
    pub temperature: f32,

    /// Per-attempt timeout
    #[serde(with = "human_duration")]
    pub timeout: Duration,

    pub retry: RetryConfig,

    pub circuit_breaker: CircuitBreakerConfig,

    pub cache: CacheConfig,

    /// Provider-specific settings handed to the provider factory
    pub provider_options: JsonValue,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            temperature: 0.0,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            cache: CacheConfig::default(),
            provider_options: JsonValue::Object(Default::default()),
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Apply `PVTRIAGE_PROVIDER`, `PVTRIAGE_MODEL` and `PVTRIAGE_TIMEOUT`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|v| !v.is_empty()) {
            self.provider = provider;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.is_empty()) {
            self.model = model;
        }
        if let Some(value) = lookup(TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            self.timeout = humantime::parse_duration(&value).map_err(|_| {
                ConfigError::InvalidDuration {
                    var: TIMEOUT_ENV,
                    value,
                }
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("provider must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be positive".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        if !self.provider_options.is_object() {
            return Err(ConfigError::Invalid(
                "provider_options must be a mapping".to_string(),
            ));
        }
        Ok(())
    }

    /// Completion settings for extraction requests.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
            json_response: true,
        }
    }
}
