//! Question generation: the one network stage, with a deterministic floor.
//!
//! [`QuestionGenerator::generate`] never fails and always returns usable
//! text. The primary path sends one bounded chat-completion request per
//! field; any degradation — missing credential, refused connection, non-200
//! status, timeout, junk body — is logged and absorbed into the template
//! fallback. One attempt, no retry: an interview turn should answer in
//! human time, and the templates are always good enough.
//!
//! The branch taken is recorded in [`QuestionSource`] so callers and tests
//! can tell a model-phrased question from a template one without the two
//! paths leaking into the public contract.

use crate::config::InterviewConfig;
use crate::error::QuestionError;
use crate::fields::FieldDescriptor;
use crate::prompts;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Which branch produced a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    /// The external model call succeeded and parsed.
    Model,
    /// The deterministic per-type template answered.
    Template,
}

/// A generated question for one field, before interview position is known.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub explanation: String,
    pub field_name: String,
    pub source: QuestionSource,
}

/// Turns field descriptors into natural-language questions.
pub struct QuestionGenerator {
    config: InterviewConfig,
    client: reqwest::Client,
}

impl QuestionGenerator {
    pub fn new(config: InterviewConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    /// Generate a question for one field, grounded in the surrounding
    /// document text. Infallible: every degradation of the model path ends
    /// in the template fallback.
    pub async fn generate(&self, field: &FieldDescriptor, context: &str) -> GeneratedQuestion {
        match self.request_model(field, context).await {
            Ok(content) => parse_model_content(&content, &field.name),
            Err(QuestionError::NotConfigured) => self.template(field),
            Err(err) => {
                warn!("question generation degraded for '{}': {err}", field.name);
                self.template(field)
            }
        }
    }

    /// Generate questions for every field concurrently, preserving input
    /// order in the output. Used to warm a whole interview up front.
    pub async fn generate_all(
        &self,
        fields: &[FieldDescriptor],
        context: &str,
    ) -> Vec<GeneratedQuestion> {
        let mut indexed: Vec<(usize, GeneratedQuestion)> =
            stream::iter(fields.iter().enumerate().map(|(index, field)| async move {
                (index, self.generate(field, context).await)
            }))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, question)| question).collect()
    }

    fn template(&self, field: &FieldDescriptor) -> GeneratedQuestion {
        let (question, explanation) = prompts::fallback_question(field);
        GeneratedQuestion {
            question,
            explanation,
            field_name: field.name.clone(),
            source: QuestionSource::Template,
        }
    }

    /// The primary path: one bounded chat-completion call.
    async fn request_model(
        &self,
        field: &FieldDescriptor,
        context: &str,
    ) -> Result<String, QuestionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(QuestionError::NotConfigured)?;

        let system_prompt = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(prompts::SYSTEM_PROMPT);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompts::field_prompt(field, context, self.config.context_limit),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("requesting question for '{}' from {}", field.name, self.config.endpoint);
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuestionError::Timeout {
                        secs: self.config.api_timeout_secs,
                    }
                } else {
                    QuestionError::Transport {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuestionError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|_| QuestionError::EmptyResponse)?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(QuestionError::EmptyResponse);
        }
        Ok(content)
    }
}

/// Parse the model's two-line reply. The first `Question:` line supplies the
/// question, the first `Help:` line the explanation; a missing piece takes
/// the deterministic default so the result is always usable.
fn parse_model_content(content: &str, field_name: &str) -> GeneratedQuestion {
    let mut question = String::new();
    let mut explanation = String::new();
    for line in content.lines() {
        let line = line.trim();
        if question.is_empty() {
            if let Some(rest) = line.strip_prefix("Question:") {
                question = rest.trim().to_string();
                continue;
            }
        }
        if explanation.is_empty() {
            if let Some(rest) = line.strip_prefix("Help:") {
                explanation = rest.trim().to_string();
            }
        }
    }
    if question.is_empty() {
        question = prompts::default_question(field_name);
    }
    if explanation.is_empty() {
        explanation = prompts::DEFAULT_EXPLANATION.to_string();
    }
    GeneratedQuestion {
        question,
        explanation,
        field_name: field_name.to_string(),
        source: QuestionSource::Model,
    }
}

// ── Chat-completion wire types ───────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    #[test]
    fn parse_extracts_both_tagged_lines() {
        let content = "Question: What is your full name?\nHelp: Enter it as on your ID.";
        let parsed = parse_model_content(content, "full_name");
        assert_eq!(parsed.question, "What is your full name?");
        assert_eq!(parsed.explanation, "Enter it as on your ID.");
        assert_eq!(parsed.source, QuestionSource::Model);
    }

    #[test]
    fn parse_takes_the_first_of_each_tag() {
        let content = "Question: First?\nQuestion: Second?\nHelp: first help\nHelp: second help";
        let parsed = parse_model_content(content, "f");
        assert_eq!(parsed.question, "First?");
        assert_eq!(parsed.explanation, "first help");
    }

    #[test]
    fn parse_substitutes_defaults_for_missing_tags() {
        let parsed = parse_model_content("the model rambled instead", "email");
        assert_eq!(parsed.question, "What should we enter for email?");
        assert_eq!(parsed.explanation, prompts::DEFAULT_EXPLANATION);
    }

    #[test]
    fn parse_tolerates_leading_whitespace() {
        let content = "  Question: Trimmed?  \n   Help: also trimmed  ";
        let parsed = parse_model_content(content, "f");
        assert_eq!(parsed.question, "Trimmed?");
        assert_eq!(parsed.explanation, "also trimmed");
    }

    #[tokio::test]
    async fn no_credential_means_template_without_network() {
        let generator = QuestionGenerator::new(InterviewConfig::default());
        let field = FieldDescriptor::new("email", FieldType::Email);
        let q = generator.generate(&field, "").await;
        assert_eq!(q.source, QuestionSource::Template);
        assert_eq!(q.question, "What is your email?");
        assert!(!q.explanation.is_empty());
    }

    #[tokio::test]
    async fn generate_all_preserves_field_order() {
        let generator = QuestionGenerator::new(InterviewConfig::default());
        let fields: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| FieldDescriptor::new(*n, FieldType::Text))
            .collect();
        let questions = generator.generate_all(&fields, "").await;
        let names: Vec<_> = questions.iter().map(|q| q.field_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }
}
