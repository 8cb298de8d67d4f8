//! Provider credentials.
//!
//! Report text is patient data and the provider key is what lets it leave
//! the process, so keys live in a [`SecretString`] and are never rendered
//! by `Debug` or `Display`.
//!
//! A [`CredentialSpec`] names where a key may come from: a key under
//! `provider_options` in the runtime config, else an environment variable
//! (which `.env` can populate). Blank values count as unset.
//!
//! ```ignore
//! const KEY: CredentialSpec = CredentialSpec::new("Gemini API key", "api_key", "GEMINI_API_KEY");
//! let credential = KEY.resolve(&config.provider_options)?;
//! request.header("x-goog-api-key", credential.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    ProviderOptions,
    Environment,
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::ProviderOptions => "provider_options",
            CredentialSource::Environment => "environment",
            CredentialSource::Programmatic => "programmatic",
        })
    }
}

/// Lookup rules for one provider credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialSpec {
    pub name: &'static str,
    pub option_key: &'static str,
    pub env_var: &'static str,
}

impl CredentialSpec {
    pub const fn new(name: &'static str, option_key: &'static str, env_var: &'static str) -> Self {
        Self {
            name,
            option_key,
            env_var,
        }
    }

    /// Resolve from `options`, falling back to the process environment.
    pub fn resolve(&self, options: &JsonValue) -> Result<ApiCredential, ProviderError> {
        self.resolve_with(options, |var| std::env::var(var).ok())
    }

    fn resolve_with(
        &self,
        options: &JsonValue,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ApiCredential, ProviderError> {
        let from_options = options
            .get(self.option_key)
            .and_then(JsonValue::as_str)
            .filter(|value| !value.trim().is_empty());
        if let Some(value) = from_options {
            return Ok(ApiCredential::new(
                value,
                CredentialSource::ProviderOptions,
                self.name,
            ));
        }

        match env(self.env_var).filter(|value| !value.trim().is_empty()) {
            Some(value) => Ok(ApiCredential::new(
                value,
                CredentialSource::Environment,
                self.name,
            )),
            None => Err(ProviderError::NotConfigured(format!(
                "{} missing: set provider_options.{} or export {}",
                self.name, self.option_key, self.env_var
            ))),
        }
    }
}

/// A provider API key. Only [`expose`](Self::expose) reveals the value.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// The raw key, for the request header only.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (from {}, redacted)", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "AIza-super-secret-key-12345";
    const SPEC: CredentialSpec = CredentialSpec::new("Test key", "api_key", "PVTRIAGE_TEST_KEY");

    fn env_with(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |var| (var == "PVTRIAGE_TEST_KEY").then(|| value.to_string())
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_credential_never_rendered() {
        let cred = ApiCredential::new(SECRET, CredentialSource::ProviderOptions, "Gemini API key");

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("Gemini API key"));

        let display = cred.to_string();
        assert!(!display.contains(SECRET));
        assert_eq!(display, "Gemini API key (from provider_options, redacted)");

        assert_eq!(cred.expose(), SECRET);
    }

    #[test]
    fn test_provider_options_win_over_environment() {
        let cred = SPEC
            .resolve_with(&json!({ "api_key": "config-key" }), env_with("env-key"))
            .unwrap();
        assert_eq!(cred.expose(), "config-key");
        assert_eq!(cred.source(), CredentialSource::ProviderOptions);
    }

    #[test]
    fn test_environment_fallback() {
        let cred = SPEC.resolve_with(&json!({}), env_with("env-key")).unwrap();
        assert_eq!(cred.expose(), "env-key");
        assert_eq!(cred.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let cred = SPEC
            .resolve_with(&json!({ "api_key": "  " }), env_with("env-key"))
            .unwrap();
        assert_eq!(cred.source(), CredentialSource::Environment);

        assert!(SPEC.resolve_with(&json!({}), env_with("")).is_err());
    }

    #[test]
    fn test_missing_credential_names_both_sources() {
        let message = SPEC
            .resolve_with(&json!({ "api_key": 42 }), no_env)
            .unwrap_err()
            .to_string();
        assert!(message.contains("Test key"));
        assert!(message.contains("provider_options.api_key"));
        assert!(message.contains("PVTRIAGE_TEST_KEY"));
    }
}
