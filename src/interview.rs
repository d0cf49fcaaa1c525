//! Interview orchestration: the operations a serving layer calls.
//!
//! Each function here is one step of the interview control flow: seed a
//! session from a source document, start it, drive it forward one answer at
//! a time, and drain it into the terminal artifact. They tie together the
//! extractors, the [`SessionRegistry`], and the [`QuestionGenerator`] — and
//! they own the locking discipline: a session's mutex is held for the whole
//! of an advance (including its question-generation call) so at most one
//! advance is ever in flight per session, while the registry and all other
//! sessions stay untouched.

use crate::error::Form2ChatError;
use crate::extract::{html, pdf};
use crate::extract::html::StructuredForm;
use crate::fields::{FieldDescriptor, SourceKind};
use crate::question::{GeneratedQuestion, QuestionGenerator};
use crate::registry::SessionRegistry;
use crate::session::{FieldPrompt, Question, SourcePayload, Step};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// What a caller learns about a freshly created session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub total_fields: usize,
    pub fields: Vec<FieldDescriptor>,
}

/// Outcome of one interview advance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum InterviewStep {
    /// The interview continues with this question.
    Question(Question),
    /// Every field has been answered; the collected mapping is returned so
    /// the caller can hand it to the artifact collaborator.
    Complete { answers: HashMap<String, String> },
}

/// Seed a session from raw PDF bytes.
///
/// Extracts the AcroForm field list (empty → [`Form2ChatError::NoFieldsFound`])
/// and the page text used to ground question generation, then registers the
/// session with the original bytes as its payload.
pub fn create_pdf_session(
    registry: &SessionRegistry,
    bytes: Vec<u8>,
) -> Result<SessionSummary, Form2ChatError> {
    let fields = pdf::extract_fields(&bytes);
    if fields.is_empty() {
        return Err(Form2ChatError::NoFieldsFound {
            kind: SourceKind::Pdf,
        });
    }
    let context = pdf::extract_text(&bytes);
    info!(
        "PDF session: {} fields, {} chars of context",
        fields.len(),
        context.len()
    );
    let (id, _) = registry.create(fields.clone(), SourcePayload::Pdf(bytes), context);
    Ok(SessionSummary {
        id,
        total_fields: fields.len(),
        fields,
    })
}

/// Seed a session from a website form.
///
/// Structured field data from the client-side collaborator takes precedence
/// over the raw markup; either way an empty field list is
/// [`Form2ChatError::NoFieldsFound`]. The HTML itself doubles as the
/// question-generation context.
pub fn create_website_session(
    registry: &SessionRegistry,
    form_html: String,
    forms: Option<&[StructuredForm]>,
) -> Result<SessionSummary, Form2ChatError> {
    let fields = html::extract_fields(&form_html, forms);
    if fields.is_empty() {
        return Err(Form2ChatError::NoFieldsFound {
            kind: SourceKind::Website,
        });
    }
    info!("website session: {} fields", fields.len());
    let context = form_html.clone();
    let (id, _) = registry.create(fields.clone(), SourcePayload::Website(form_html), context);
    Ok(SessionSummary {
        id,
        total_fields: fields.len(),
        fields,
    })
}

/// Start (or restart) a session's interview and return the question for its
/// first field.
pub async fn start_session(
    registry: &SessionRegistry,
    generator: &QuestionGenerator,
    id: &str,
) -> Result<Question, Form2ChatError> {
    let handle = registry.get(id)?;
    let mut session = handle.lock().await;
    let prompt = session.start()?;
    let generated = generator.generate(&prompt.field, session.context()).await;
    Ok(position_question(generated, &prompt))
}

/// Record an answer for the current field (when given) and move to the next
/// one, returning either its question or the completed answer mapping.
pub async fn advance_session(
    registry: &SessionRegistry,
    generator: &QuestionGenerator,
    id: &str,
    answer: Option<String>,
) -> Result<InterviewStep, Form2ChatError> {
    let handle = registry.get(id)?;
    let mut session = handle.lock().await;
    match session.advance(answer) {
        Step::Complete => {
            info!("session {id} complete: {} answers", session.answers().len());
            Ok(InterviewStep::Complete {
                answers: session.answers().clone(),
            })
        }
        Step::Ask(prompt) => {
            let generated = generator.generate(&prompt.field, session.context()).await;
            Ok(InterviewStep::Question(position_question(generated, &prompt)))
        }
    }
}

/// Produce the completed PDF for a finished PDF session and tear the
/// session down.
///
/// On a fill failure the session (and its answers) is deliberately kept so
/// nothing the user said is lost; the caller sees
/// [`Form2ChatError::ArtifactFailed`] and may retry or drain the answers
/// some other way.
pub async fn complete_pdf_session(
    registry: &SessionRegistry,
    id: &str,
) -> Result<Vec<u8>, Form2ChatError> {
    let handle = registry.get(id)?;
    let filled = {
        let session = handle.lock().await;
        let bytes = match session.payload() {
            SourcePayload::Pdf(bytes) => bytes,
            SourcePayload::Website(_) => {
                return Err(Form2ChatError::SessionKindMismatch {
                    id: id.to_string(),
                    expected: SourceKind::Pdf,
                    actual: session.kind(),
                })
            }
        };
        if session.answers().is_empty() {
            return Err(Form2ChatError::NoAnswers { id: id.to_string() });
        }
        pdf::try_fill(bytes, session.answers()).map_err(|e| {
            warn!("session {id}: fill failed, keeping session: {e}");
            Form2ChatError::ArtifactFailed {
                id: id.to_string(),
                detail: e.to_string(),
            }
        })?
    };
    registry.remove(id);
    info!("session {id}: completed PDF produced ({} bytes)", filled.len());
    Ok(filled)
}

/// Snapshot the collected answers of a website session — the input the
/// field-injection collaborator applies to the live page. The session stays
/// registered until the caller removes it.
pub async fn website_field_values(
    registry: &SessionRegistry,
    id: &str,
) -> Result<HashMap<String, String>, Form2ChatError> {
    let handle = registry.get(id)?;
    let session = handle.lock().await;
    if session.kind() != SourceKind::Website {
        return Err(Form2ChatError::SessionKindMismatch {
            id: id.to_string(),
            expected: SourceKind::Website,
            actual: session.kind(),
        });
    }
    Ok(session.answers().clone())
}

/// Record an out-of-band binary attachment (e.g. a signature image) against
/// a field of the session.
pub async fn attach_image(
    registry: &SessionRegistry,
    id: &str,
    field_name: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<(), Form2ChatError> {
    let handle = registry.get(id)?;
    handle.lock().await.attach_image(field_name, filename, bytes);
    Ok(())
}

fn position_question(generated: GeneratedQuestion, prompt: &FieldPrompt) -> Question {
    Question {
        text: generated.question,
        explanation: generated.explanation,
        field_name: generated.field_name,
        current: prompt.current,
        total: prompt.total,
        source: generated.source,
    }
}
