//! Configuration for question generation and interview behaviour.
//!
//! Every knob lives in one [`InterviewConfig`] struct, built via its
//! [`InterviewConfigBuilder`]. Keeping the configuration in one place makes
//! it trivial to share across sessions, log, and diff two runs to understand
//! why their questions differ.
//!
//! The presence or absence of `api_key` is the single switch between the
//! primary model-backed path and fallback-only operation: no key means every
//! question comes from the deterministic templates, with no network I/O at
//! all.

use crate::error::Form2ChatError;
use std::fmt;

/// Default chat-completion endpoint (OpenRouter).
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

/// Configuration for a [`crate::question::QuestionGenerator`].
///
/// Built via [`InterviewConfig::builder()`], [`InterviewConfig::default()`],
/// or [`InterviewConfig::from_env()`].
///
/// # Example
/// ```rust
/// use form2chat::InterviewConfig;
///
/// let config = InterviewConfig::builder()
///     .model("mistralai/mistral-7b-instruct")
///     .api_timeout_secs(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct InterviewConfig {
    /// Access credential for the question-generation endpoint.
    ///
    /// `None` (the default) disables the primary path entirely: the
    /// generator answers from templates without touching the network.
    pub api_key: Option<String>,

    /// Chat-completion endpoint URL. Default: [`DEFAULT_ENDPOINT`].
    ///
    /// Overridable so tests can point the generator at a local fixture and
    /// deployments can route through a proxy.
    pub endpoint: String,

    /// Model identifier sent in the request body. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Default: 0.7.
    ///
    /// Question phrasing benefits from a little variety; anything near 0
    /// produces the same sentence for every text field, anything much
    /// higher starts drifting off the field entirely.
    pub temperature: f32,

    /// Maximum tokens the model may generate per question. Default: 150.
    ///
    /// A question plus one help sentence fits comfortably; a larger budget
    /// only invites the model to ramble past the two-line format.
    pub max_tokens: usize,

    /// Per-call timeout in seconds. Default: 15.
    ///
    /// The model call is the only network I/O in the crate and the
    /// interview blocks on it, so the bound is short. One attempt, no
    /// retry: on timeout the template fallback answers instead.
    pub api_timeout_secs: u64,

    /// Maximum number of context characters sent with each field. Default: 500.
    ///
    /// The surrounding document text grounds the question ("Date" on a tax
    /// form vs. a booking form) but whole documents would dominate the
    /// prompt; an excerpt is enough signal.
    pub context_limit: usize,

    /// Concurrent model calls during pre-generation. Default: 4.
    ///
    /// Only [`crate::question::QuestionGenerator::generate_all`] fans out;
    /// the interview itself is strictly one call per advance.
    pub concurrency: usize,

    /// Custom system prompt. If `None`, uses the built-in default.
    pub system_prompt: Option<String>,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 150,
            api_timeout_secs: 15,
            context_limit: 500,
            concurrency: 4,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for InterviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterviewConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("context_limit", &self.context_limit)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl InterviewConfig {
    /// Create a new builder for `InterviewConfig`.
    pub fn builder() -> InterviewConfigBuilder {
        InterviewConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from the environment.
    ///
    /// Reads the credential from `FORM2CHAT_API_KEY`, falling back to
    /// `OPENROUTER_API_KEY`, and an optional model override from
    /// `FORM2CHAT_MODEL`. Missing variables leave the defaults in place —
    /// with no key present the generator runs in fallback-only mode.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = std::env::var("FORM2CHAT_API_KEY")
            .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        if let Ok(model) = std::env::var("FORM2CHAT_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        config
    }

    /// Whether the primary model-backed path is available.
    pub fn has_model(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Builder for [`InterviewConfig`].
#[derive(Debug)]
pub struct InterviewConfigBuilder {
    config: InterviewConfig,
}

impl InterviewConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn context_limit(mut self, chars: usize) -> Self {
        self.config.context_limit = chars;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<InterviewConfig, Form2ChatError> {
        let c = &self.config;
        if c.endpoint.is_empty() || !c.endpoint.starts_with("http") {
            return Err(Form2ChatError::InvalidConfig(format!(
                "endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.model.is_empty() {
            return Err(Form2ChatError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fallback_only() {
        let c = InterviewConfig::default();
        assert!(!c.has_model());
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.api_timeout_secs, 15);
        assert_eq!(c.context_limit, 500);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = InterviewConfig::builder()
            .temperature(9.0)
            .max_tokens(0)
            .concurrency(0)
            .api_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_tokens, 1);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.api_timeout_secs, 1);
    }

    #[test]
    fn builder_rejects_non_http_endpoint() {
        let err = InterviewConfig::builder().endpoint("ftp://nope").build();
        assert!(err.is_err());
    }

    #[test]
    fn empty_api_key_counts_as_absent() {
        let c = InterviewConfig::builder().api_key("").build().unwrap();
        assert!(!c.has_model());
    }

    #[test]
    fn debug_redacts_the_credential() {
        let c = InterviewConfig::builder().api_key("sk-secret").build().unwrap();
        let rendered = format!("{c:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
