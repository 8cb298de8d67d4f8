//! Resilience patterns for pvtriage-runtime.
//!
//! - Circuit breaker keyed by provider name
//! - Retry with exponential backoff (applied in the extractor via `backon`)

mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
