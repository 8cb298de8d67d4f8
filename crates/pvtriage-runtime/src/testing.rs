//! Test doubles shared by the runtime's unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::{RetryConfig, RuntimeConfig};
use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

/// A patient-reported facial swelling with dose, start date and outcome
/// left out.
pub const EXTRACTION_REPLY: &str = r#"{
    "detectedInfo": {
        "reporter_type": "Patient",
        "patient_age": 68,
        "gender": "Female",
        "drug_name": "CardioFix",
        "event_description": "Face very swollen and itchy after starting CardioFix",
        "seriousness": "Non-Serious",
        "hospitalized": false
    },
    "missingFields": ["Drug Dosage", "Event Start Date", "Event Outcome", "Medical History"],
    "priority": "High",
    "reasoning": "Facial swelling may indicate angioedema."
}"#;

/// Runtime config with millisecond retry delays.
pub fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        retry: RetryConfig {
            max_attempts: 2,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        ..Default::default()
    }
}

/// Provider that replays scripted replies in order.
///
/// After the script runs out it keeps returning the fallback reply, or a
/// `NotConfigured` error when there is none.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    healthy: bool,
    calls: AtomicUsize,
    last_messages: Mutex<Option<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            delay: None,
            healthy: true,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(None),
        }
    }

    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.last_messages.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock() = Some(messages);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().pop_front();
        let content = match next {
            Some(result) => result?,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ProviderError::NotConfigured("script exhausted".to_string()))?,
        };

        Ok(CompletionResponse {
            content,
            usage: TokenUsage::default(),
            model: config.model.clone(),
            stop_reason: Some("STOP".to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
