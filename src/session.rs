//! Per-interview session state: a field list, a cursor, and the answers.
//!
//! A [`Session`] is the stateful core of one interview. It owns the ordered
//! field list extracted from exactly one source document, a cursor that only
//! ever moves forward by one, and the accumulating name→answer map. It does
//! no I/O of any kind — question text is produced elsewhere and the
//! completed artifact is materialized elsewhere — which keeps the state
//! machine synchronous and exhaustively testable.
//!
//! Lifecycle: created by [`crate::registry::SessionRegistry::create`] after
//! a successful extraction, mutated only through [`Session::start`] /
//! [`Session::advance`] / [`Session::attach_image`], and discarded once its
//! terminal artifact has been produced.

use crate::error::Form2ChatError;
use crate::fields::{FieldDescriptor, SourceKind};
use crate::question::QuestionSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// The source document a session was seeded from, kept verbatim so the
/// terminal artifact can be produced from the original bytes.
#[derive(Debug, Clone)]
pub enum SourcePayload {
    /// Raw bytes of the uploaded PDF.
    Pdf(Vec<u8>),
    /// Raw HTML of the analyzed page form.
    Website(String),
}

impl SourcePayload {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourcePayload::Pdf(_) => SourceKind::Pdf,
            SourcePayload::Website(_) => SourceKind::Website,
        }
    }
}

/// A question ready for display: generated text plus interview position.
///
/// Produced fresh on each advance, never stored. `current`/`total` are
/// 1-based for display.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub text: String,
    pub explanation: String,
    pub field_name: String,
    pub current: usize,
    pub total: usize,
    /// Which branch produced the text: the model call or the deterministic
    /// template.
    pub source: QuestionSource,
}

/// The field the interview is currently pointing at, with its 1-based
/// display position.
#[derive(Debug, Clone)]
pub struct FieldPrompt {
    pub field: FieldDescriptor,
    pub current: usize,
    pub total: usize,
}

/// Outcome of one [`Session::advance`] call.
#[derive(Debug, Clone)]
pub enum Step {
    /// The interview continues with this field.
    Ask(FieldPrompt),
    /// Every field has been visited; the session is ready to be drained.
    Complete,
}

/// One interview over one source document.
#[derive(Debug)]
pub struct Session {
    id: String,
    fields: Vec<FieldDescriptor>,
    cursor: usize,
    answers: HashMap<String, String>,
    payload: SourcePayload,
    context: String,
    attachments: HashMap<String, Vec<u8>>,
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(
        fields: Vec<FieldDescriptor>,
        payload: SourcePayload,
        context: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fields,
            cursor: 0,
            answers: HashMap::new(),
            payload,
            context,
            attachments: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn kind(&self) -> SourceKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &SourcePayload {
        &self.payload
    }

    /// Document text used to ground question generation: the PDF's page
    /// text, or the raw HTML for a website session.
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn attachment(&self, field_name: &str) -> Option<&[u8]> {
        self.attachments.get(field_name).map(Vec::as_slice)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The session is complete once the cursor has walked past the last
    /// field.
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.fields.len()
    }

    /// Reset the cursor to the first field and return its prompt.
    ///
    /// Errors with [`Form2ChatError::NoFieldsFound`] when there is nothing
    /// to ask — sessions are normally created only from non-empty
    /// extractions, so this guards the constructor's contract.
    pub fn start(&mut self) -> Result<FieldPrompt, Form2ChatError> {
        if self.fields.is_empty() {
            return Err(Form2ChatError::NoFieldsFound { kind: self.kind() });
        }
        self.cursor = 0;
        Ok(self.prompt_at(0))
    }

    /// Record `answer` against the current field (overwriting any earlier
    /// value — there are no append semantics) and move the cursor forward
    /// by exactly one.
    ///
    /// Advancing a completed session is a no-op that keeps reporting
    /// [`Step::Complete`].
    pub fn advance(&mut self, answer: Option<String>) -> Step {
        if let Some(answer) = answer {
            if let Some(field) = self.fields.get(self.cursor) {
                self.answers.insert(field.name.clone(), answer);
            }
        }
        if self.cursor < self.fields.len() {
            self.cursor += 1;
        }
        if self.is_complete() {
            Step::Complete
        } else {
            Step::Ask(self.prompt_at(self.cursor))
        }
    }

    /// Record an out-of-band binary attachment (e.g. a signature image)
    /// against a field name. The answer map gets the opaque marker string
    /// the artifact layer understands; the bytes stay with the session.
    pub fn attach_image(&mut self, field_name: &str, filename: &str, bytes: Vec<u8>) {
        self.attachments.insert(field_name.to_string(), bytes);
        self.answers.insert(
            field_name.to_string(),
            format!("[IMAGE_UPLOADED: {filename}]"),
        );
    }

    fn prompt_at(&self, index: usize) -> FieldPrompt {
        FieldPrompt {
            field: self.fields[index].clone(),
            current: index + 1,
            total: self.fields.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    fn session(names: &[&str]) -> Session {
        let fields = names
            .iter()
            .map(|n| FieldDescriptor::new(*n, FieldType::Text))
            .collect();
        Session::new(fields, SourcePayload::Website("<form/>".into()), String::new())
    }

    #[test]
    fn start_returns_first_field_at_position_one() {
        let mut s = session(&["a", "b"]);
        let prompt = s.start().unwrap();
        assert_eq!(prompt.field.name, "a");
        assert_eq!((prompt.current, prompt.total), (1, 2));
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn start_on_empty_field_list_errors() {
        let mut s = session(&[]);
        assert!(matches!(
            s.start(),
            Err(Form2ChatError::NoFieldsFound { .. })
        ));
    }

    #[test]
    fn cursor_visits_every_field_exactly_once() {
        let mut s = session(&["a", "b", "c"]);
        s.start().unwrap();
        for expected in 1..3 {
            match s.advance(Some(format!("answer {expected}"))) {
                Step::Ask(prompt) => {
                    assert_eq!(prompt.current, expected + 1);
                    assert_eq!(prompt.total, 3);
                    assert_eq!(s.cursor(), expected);
                }
                Step::Complete => panic!("completed early at cursor {}", s.cursor()),
            }
        }
        assert!(matches!(s.advance(Some("last".into())), Step::Complete));
        assert!(s.is_complete());
        assert_eq!(s.cursor(), 3);
        assert_eq!(s.answers().len(), 3);
    }

    #[test]
    fn advance_records_only_the_current_field() {
        let mut s = session(&["a", "b"]);
        s.start().unwrap();
        s.advance(Some("first".into()));
        assert_eq!(s.answers().get("a").map(String::as_str), Some("first"));
        assert!(s.answers().get("b").is_none());
    }

    #[test]
    fn answer_for_current_field_overwrites_not_appends() {
        let mut s = session(&["sig", "b"]);
        s.start().unwrap();
        // An attachment marker recorded against the current field…
        s.attach_image("sig", "scan.png", vec![1, 2, 3]);
        assert_eq!(
            s.answers().get("sig").map(String::as_str),
            Some("[IMAGE_UPLOADED: scan.png]")
        );
        // …is overwritten by the spoken answer on advance.
        s.advance(Some("true".into()));
        assert_eq!(s.answers().get("sig").map(String::as_str), Some("true"));
        assert_eq!(s.answers().len(), 1);
    }

    #[test]
    fn advance_without_answer_skips_recording() {
        let mut s = session(&["a", "b"]);
        s.start().unwrap();
        s.advance(None);
        assert!(s.answers().is_empty());
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn advancing_past_complete_stays_complete() {
        let mut s = session(&["a"]);
        s.start().unwrap();
        assert!(matches!(s.advance(Some("x".into())), Step::Complete));
        assert!(matches!(s.advance(Some("y".into())), Step::Complete));
        assert_eq!(s.cursor(), 1);
        // the stray answer was not recorded against anything
        assert_eq!(s.answers().len(), 1);
    }

    #[test]
    fn attachment_bytes_are_retrievable() {
        let mut s = session(&["sig"]);
        s.attach_image("sig", "scan.png", vec![9, 9]);
        assert_eq!(s.attachment("sig"), Some(&[9u8, 9u8][..]));
        assert!(s.attachment("other").is_none());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(session(&["a"]).id(), session(&["a"]).id());
    }
}
