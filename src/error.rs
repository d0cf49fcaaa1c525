//! Error types for the form2chat library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Form2ChatError`] — **Caller-visible**: an interview operation cannot
//!   produce its result (no fillable fields, unknown session, wrong session
//!   kind). Returned as `Err(Form2ChatError)` from the `interview` entry
//!   points. None of these is fatal to the process.
//!
//! * [`QuestionError`] — **Absorbed**: the question-generation endpoint is
//!   unreachable, slow, or returned junk. This never crosses the public API;
//!   [`crate::question::QuestionGenerator`] logs it and falls back to the
//!   deterministic template, tagging the result
//!   [`crate::question::QuestionSource::Template`].
//!
//! The separation keeps the degraded-model branch testable on its own (each
//! `QuestionError` variant maps to one simulated failure) while the public
//! contract stays "a question is always produced".

use crate::fields::SourceKind;
use thiserror::Error;

/// All caller-visible errors returned by the form2chat library.
#[derive(Debug, Error)]
pub enum Form2ChatError {
    /// Extraction ran but found nothing fillable. A first-class outcome the
    /// caller must check, not an internal failure.
    #[error("no fillable fields found in the {kind} source")]
    NoFieldsFound { kind: SourceKind },

    /// Lookup against an unknown, expired, or already-deleted identifier.
    #[error("session not found: '{id}'")]
    SessionNotFound { id: String },

    /// Operation requested against a session of the wrong source kind,
    /// e.g. PDF completion on a website session.
    #[error("session '{id}' is a {actual} session, expected {expected}")]
    SessionKindMismatch {
        id: String,
        expected: SourceKind,
        actual: SourceKind,
    },

    /// Completion requested before any answer was recorded.
    #[error("session '{id}' has no recorded answers")]
    NoAnswers { id: String },

    /// The completed document could not be produced. The session and its
    /// answers are kept so the caller can retry or drain them.
    #[error("could not produce the completed document for session '{id}': {detail}")]
    ArtifactFailed { id: String, detail: String },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal failure of the primary question-generation path.
///
/// Always absorbed into the template fallback; kept as a typed enum so each
/// degradation branch can be asserted in tests without network mocking.
#[derive(Debug, Clone, Error)]
pub enum QuestionError {
    /// No access credential configured — fallback-only mode.
    #[error("no model endpoint configured")]
    NotConfigured,

    /// Endpoint answered with a non-success status code.
    #[error("model endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Connection-level failure (refused, DNS, reset).
    #[error("model call transport failure: {detail}")]
    Transport { detail: String },

    /// The bounded per-call timeout elapsed.
    #[error("model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Response body was empty or not a parseable chat completion.
    #[error("model response was empty or malformed")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_display_names_both_kinds() {
        let e = Form2ChatError::SessionKindMismatch {
            id: "abc".into(),
            expected: SourceKind::Pdf,
            actual: SourceKind::Website,
        };
        let msg = e.to_string();
        assert!(msg.contains("website"), "got: {msg}");
        assert!(msg.contains("pdf"), "got: {msg}");
    }

    #[test]
    fn no_fields_display_names_the_source() {
        let e = Form2ChatError::NoFieldsFound {
            kind: SourceKind::Pdf,
        };
        assert!(e.to_string().contains("pdf"));
    }

    #[test]
    fn timeout_display_includes_seconds() {
        let e = QuestionError::Timeout { secs: 15 };
        assert!(e.to_string().contains("15s"));
    }
}
