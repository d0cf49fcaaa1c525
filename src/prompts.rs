//! Prompt text and fallback templates for question generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing how questions are phrased (the
//!    system instruction, the per-field prompt, a fallback template) means
//!    editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts and templates
//!    directly without a live model behind them.
//!
//! Callers can override the system prompt via
//! [`crate::config::InterviewConfig::system_prompt`]; the constant here is
//! used only when no override is provided.

use crate::fields::{FieldDescriptor, FieldType};

/// Default system instruction for the question-generation endpoint.
///
/// Constrains the model to the one field at hand and to an exactly-two-line
/// output that [`crate::question`] can parse without guesswork.
pub const SYSTEM_PROMPT: &str = r#"You are a professional form assistant helping users fill out forms.
Your ONLY job is to convert form field names into clear, professional questions.

CRITICAL RULES:
1. ONLY ask about the EXACT field provided
2. Match question type to field type
3. Be professional and helpful
4. Keep questions concise and clear
5. NEVER ask the same question twice

OUTPUT FORMAT:
Question: [Your question here]
Help: [One sentence explaining what to enter]"#;

/// Default question text when the model reply lacks a `Question:` line.
pub fn default_question(field_name: &str) -> String {
    format!("What should we enter for {field_name}?")
}

/// Default explanation when the model reply lacks a `Help:` line.
pub const DEFAULT_EXPLANATION: &str = "Please provide the requested information.";

/// Build the user prompt for one field.
///
/// The surrounding document text is capped at `context_limit` characters —
/// enough to disambiguate the field, not enough to drown the instruction.
pub fn field_prompt(field: &FieldDescriptor, context: &str, context_limit: usize) -> String {
    let excerpt: String = context.chars().take(context_limit).collect();
    let context_line = if excerpt.trim().is_empty() {
        "General form field".to_string()
    } else {
        excerpt
    };
    format!(
        "Convert this form field into a natural question:\n\n\
         Field Name: {}\n\
         Field Type: {}\n\
         Label: {}\n\n\
         Context: {}\n\n\
         Generate a clear question and helpful explanation.",
        field.name,
        field.field_type,
        field.label.as_deref().unwrap_or(""),
        context_line,
    )
}

/// Deterministic fallback: a `(question, explanation)` pair keyed on the
/// field's declared type, parameterized by its display label.
///
/// This is the complete non-model path — it must produce usable text for
/// every [`FieldType`] with no external calls and no failure mode.
pub fn fallback_question(field: &FieldDescriptor) -> (String, String) {
    let label = field.display_label().to_lowercase();
    match field.field_type {
        FieldType::Email => (
            format!("What is your {label}?"),
            "Please enter a valid email address.".to_string(),
        ),
        FieldType::Tel => (
            format!("What is your {label}?"),
            "Please enter your phone number.".to_string(),
        ),
        FieldType::Date => (
            format!("What is the {label}?"),
            "Please enter the date (e.g., MM/DD/YYYY).".to_string(),
        ),
        FieldType::Select => (
            format!("Please select {label}"),
            "Choose from the available options.".to_string(),
        ),
        _ => (
            format!("What is your {label}?"),
            DEFAULT_EXPLANATION.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor::new(name, field_type)
    }

    #[test]
    fn fallback_phrasing_varies_by_type() {
        let (q, e) = fallback_question(&field("email", FieldType::Email));
        assert_eq!(q, "What is your email?");
        assert!(e.contains("email address"));

        let (q, _) = fallback_question(&field("birth_date", FieldType::Date));
        assert_eq!(q, "What is the birth date?");

        let (q, e) = fallback_question(&field("country", FieldType::Select));
        assert_eq!(q, "Please select country");
        assert!(e.contains("options"));
    }

    #[test]
    fn fallback_generic_branch_uses_humanized_name() {
        let (q, e) = fallback_question(&field("full_name", FieldType::Text));
        assert_eq!(q, "What is your full name?");
        assert_eq!(e, DEFAULT_EXPLANATION);
    }

    #[test]
    fn fallback_prefers_source_label() {
        let f = field("fld_7", FieldType::Text).with_label("Company Name");
        let (q, _) = fallback_question(&f);
        assert_eq!(q, "What is your company name?");
    }

    #[test]
    fn field_prompt_caps_context() {
        let f = field("total", FieldType::Text);
        let long_context = "x".repeat(2_000);
        let prompt = field_prompt(&f, &long_context, 500);
        assert!(prompt.contains(&"x".repeat(500)));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[test]
    fn field_prompt_notes_missing_context() {
        let f = field("total", FieldType::Text);
        let prompt = field_prompt(&f, "", 500);
        assert!(prompt.contains("General form field"));
    }
}
