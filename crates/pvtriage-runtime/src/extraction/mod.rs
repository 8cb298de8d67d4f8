//! Free-text report extraction.
//!
//! [`ReportExtractor`] sends a report to the configured provider and turns
//! the reply into a [`PartialReport`](pvtriage_core::PartialReport) plus
//! an advisory assessment. It:
//! - retries transient provider failures with exponential backoff
//! - fails fast while the provider's circuit is open
//! - bounds each attempt with a timeout
//! - caches replies per model and normalised report text

mod response;

pub use response::{parse_extraction, strip_code_fences, AdvisoryAssessment, Extraction};

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use thiserror::Error;

use crate::cache::{CacheKey, ExtractionCache};
use crate::config::{RetryConfig, RuntimeConfig};
use crate::prompts::{extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};
use crate::resilience::CircuitBreaker;

/// Errors from report extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Provider '{0}' is unavailable (circuit open)")]
    CircuitOpen(String),

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),
}

/// Extracts structured facts from free-text reports.
pub struct ReportExtractor {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    retry: RetryConfig,
    circuit_breaker: CircuitBreaker,
    cache: Option<ExtractionCache>,
}

impl ReportExtractor {
    /// Create an extractor from runtime configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: &RuntimeConfig) -> Self {
        Self {
            provider,
            completion: config.completion_config(),
            retry: config.retry.clone(),
            circuit_breaker: CircuitBreaker::new(config.circuit_breaker.clone()),
            cache: config
                .cache
                .enabled
                .then(|| ExtractionCache::from_config(&config.cache)),
        }
    }

    pub fn builder() -> ReportExtractorBuilder {
        ReportExtractorBuilder::new()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Fail early when the provider reports it cannot take requests.
    pub async fn ensure_ready(&self) -> Result<(), ExtractionError> {
        if self.provider.health_check().await {
            return Ok(());
        }
        tracing::warn!(provider = self.provider_name(), "provider failed health check");
        Err(ProviderError::NotConfigured(format!(
            "provider '{}' is not ready",
            self.provider_name()
        ))
        .into())
    }

    /// Extract facts from one report.
    pub async fn extract(&self, text: &str) -> Result<Extraction, ExtractionError> {
        let key = CacheKey::new(&self.completion.model, text);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                tracing::debug!(provider = self.provider_name(), "extraction cache hit");
                return Ok(hit);
            }
        }

        let provider = self.provider_name();
        if self.circuit_breaker.is_open(provider) {
            tracing::warn!(provider, "circuit open, skipping extraction");
            return Err(ExtractionError::CircuitOpen(provider.to_string()));
        }

        let messages = vec![
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(extraction_prompt(text)),
        ];

        let content = match self.complete_with_retry(messages).await {
            Ok(content) => {
                self.circuit_breaker.record_success(provider);
                content
            }
            Err(e) => {
                self.circuit_breaker.record_failure(provider);
                tracing::warn!(provider, error = %e, "extraction failed");
                return Err(e.into());
            }
        };

        let extraction = parse_extraction(&content)?;
        if let Some(cache) = &self.cache {
            cache.insert(key, extraction.clone()).await;
        }
        Ok(extraction)
    }

    async fn complete_with_retry(&self, messages: Vec<ChatMessage>) -> Result<String, ProviderError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry.min_delay)
            .with_max_delay(self.retry.max_delay)
            .with_max_times(self.retry.max_attempts)
            .with_jitter();

        let attempt = || {
            let messages = messages.clone();
            async move { self.complete_once(messages).await }
        };

        attempt
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(ProviderError::is_transient)
            .notify(|err: &ProviderError, delay: Duration| {
                tracing::warn!(
                    provider = self.provider_name(),
                    error = %err,
                    retry_in = ?delay,
                    "transient provider failure, retrying"
                );
            })
            .await
    }

    async fn complete_once(&self, messages: Vec<ChatMessage>) -> Result<String, ProviderError> {
        let timeout = self.completion.timeout;
        match tokio::time::timeout(timeout, self.provider.complete(messages, &self.completion)).await
        {
            Ok(Ok(response)) => {
                tracing::debug!(
                    provider = self.provider_name(),
                    model = %response.model,
                    tokens = response.usage.total(),
                    "extraction completion received"
                );
                Ok(response.content)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(timeout)),
        }
    }
}

impl std::fmt::Debug for ReportExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportExtractor")
            .field("provider", &self.provider_name())
            .field("model", &self.completion.model)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

/// Builder for ReportExtractor.
pub struct ReportExtractorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: RuntimeConfig,
}

impl ReportExtractorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ReportExtractor, ProviderError> {
        let provider = self
            .provider
            .ok_or_else(|| ProviderError::NotConfigured("No provider set".to_string()))?;
        Ok(ReportExtractor::new(provider, &self.config))
    }
}

impl Default for ReportExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
