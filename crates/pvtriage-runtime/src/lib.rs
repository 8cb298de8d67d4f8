//! # pvtriage-runtime
//!
//! Optional LLM-assisted intake for pvtriage.
//!
//! Turns a free-text adverse event report into structured facts and hands
//! them to `pvtriage-core`, which derives missing fields, priority and
//! follow-up recipient deterministically.
//!
//! ## Important
//!
//! This crate is OPTIONAL. Manual and file-based intake in `pvtriage-core`
//! never makes LLM calls. Whatever the model says about priority or gaps
//! is kept as an advisory assessment and never used for triage.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pvtriage_runtime::{IntakePipeline, ProviderRegistry, ReportExtractor, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_yaml_file("pvtriage.yaml")?.with_env_overrides()?;
//! let provider = ProviderRegistry::with_defaults()
//!     .create(&config.provider, &config.provider_options)?;
//! let pipeline = IntakePipeline::new(ReportExtractor::new(provider, &config));
//!
//! let outcome = pipeline.process(text, &mut store, today).await?;
//! println!("{} -> {}", outcome.case_id, outcome.record.priority);
//! ```

pub mod cache;
pub mod config;
pub mod extraction;
pub mod intake;
pub mod prompts;
pub mod providers;
pub mod resilience;

#[cfg(test)]
mod testing;

pub use cache::{CacheKey, ExtractionCache};
pub use config::{CacheConfig, ConfigError, RetryConfig, RuntimeConfig};
pub use extraction::{
    AdvisoryAssessment, Extraction, ExtractionError, ReportExtractor, ReportExtractorBuilder,
};
pub use intake::{AdvisoryDisagreement, IntakeError, IntakeOutcome, IntakePipeline};
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderFactory, ProviderRegistry, TokenUsage,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

#[cfg(feature = "gemini")]
pub use providers::{GeminiProvider, GeminiProviderFactory};
