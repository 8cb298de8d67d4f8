//! Shared text patterns for the triage rules.
//!
//! Keyword matching is a plain case-insensitive substring test, so
//! "painful" and "back pain" both count as a pain mention.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Symptoms that push an otherwise non-serious case to Medium priority.
    pub static ref MODERATE_SYMPTOM_PATTERN: Regex = Regex::new(r"(?i)dizzy|pain").unwrap();
}

/// Check if a free-text description mentions a moderate symptom.
pub fn mentions_moderate_symptom(description: &str) -> bool {
    MODERATE_SYMPTOM_PATTERN.is_match(description)
}
