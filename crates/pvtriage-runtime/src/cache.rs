//! Caching layer for pvtriage-runtime.
//!
//! Re-submitting the same free-text report (a reviewer retrying intake, or
//! a demo replay) reuses the earlier extraction instead of another
//! provider call.

use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::config::CacheConfig;
use crate::extraction::Extraction;

/// Cache key: the model plus the report text with whitespace normalised.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model: String,
    text_hash: u64,
}

impl CacheKey {
    pub fn new(model: &str, text: &str) -> Self {
        Self {
            model: model.to_string(),
            text_hash: hash_text(text),
        }
    }
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    for word in text.split_whitespace() {
        word.hash(&mut hasher);
    }
    hasher.finish()
}

/// Extraction cache using moka.
pub struct ExtractionCache {
    cache: Cache<CacheKey, Extraction>,
}

impl ExtractionCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Extraction> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, extraction: Extraction) {
        self.cache.insert(key, extraction).await;
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvtriage_core::PartialReport;

    #[test]
    fn test_key_ignores_whitespace_layout() {
        let a = CacheKey::new("gemini-2.5-flash", "Patient  felt\n dizzy ");
        let b = CacheKey::new("gemini-2.5-flash", "Patient felt dizzy");
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_depends_on_model_and_words() {
        let base = CacheKey::new("gemini-2.5-flash", "Patient felt dizzy");
        assert_ne!(base, CacheKey::new("gemini-2.5-pro", "Patient felt dizzy"));
        assert_ne!(base, CacheKey::new("gemini-2.5-flash", "Patient felt dizzy twice"));
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = ExtractionCache::default();
        let key = CacheKey::new("m", "Slight headache after use.");

        assert!(cache.get(&key).await.is_none());

        let extraction = Extraction {
            detected: PartialReport {
                drug_name: Some("VitaBoost".to_string()),
                ..Default::default()
            },
            advisory: Default::default(),
        };
        cache.insert(key.clone(), extraction.clone()).await;

        assert_eq!(cache.get(&key).await, Some(extraction));
    }
}
