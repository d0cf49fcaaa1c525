//! Canonical field descriptors shared by both extraction paths.
//!
//! A [`FieldDescriptor`] is the one record format the rest of the crate
//! speaks, regardless of whether a field came out of a PDF's AcroForm
//! dictionary or an HTML `<input>` tag. Extraction produces an ordered list
//! of them; the interview walks that list; filling consumes the answers
//! keyed by `name`. Descriptors are immutable once extracted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse type of a form field.
///
/// PDF extraction only ever produces `Text`, `Checkbox`, or `Choice` (the
/// three AcroForm field kinds). The remaining variants come from HTML
/// sources — either declared by the structured client-side data or implied
/// by the matched markup construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Checkbox,
    Choice,
    Textarea,
    Select,
    Email,
    Tel,
    Date,
}

impl FieldType {
    /// Parse a declared type string from structured form data.
    ///
    /// Unknown or missing declarations fall back to `Text` — a descriptor
    /// always has a usable type.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "checkbox" => FieldType::Checkbox,
            "choice" => FieldType::Choice,
            "textarea" => FieldType::Textarea,
            "select" | "select-one" | "select-multiple" => FieldType::Select,
            "email" => FieldType::Email,
            "tel" | "phone" => FieldType::Tel,
            "date" => FieldType::Date,
            _ => FieldType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Checkbox => "checkbox",
            FieldType::Choice => "choice",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fillable field recovered from a source document.
///
/// Identity is `name` (unique within a form); position in the owning list is
/// interview order — document order for PDF sources, first-seen order for
/// HTML sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Human-readable label when the source provides one. PDF fields carry
    /// none; HTML extraction always fills it (humanized name at worst).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label to show a human: the source label when present, otherwise
    /// the humanized raw name.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(l) if !l.is_empty() => l.clone(),
            _ => humanize_name(&self.name),
        }
    }
}

/// Which kind of source document a session was seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Website,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Pdf => "pdf",
            SourceKind::Website => "website",
        })
    }
}

/// Turn a raw field name into readable text: separators become spaces and
/// each word is title-cased (`"billing_email-address"` → `"Billing Email
/// Address"`).
pub fn humanize_name(name: &str) -> String {
    name.split(|c| c == '_' || c == '-' || c == ' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_replaces_separators_and_title_cases() {
        assert_eq!(humanize_name("full_name"), "Full Name");
        assert_eq!(humanize_name("billing-email"), "Billing Email");
        assert_eq!(humanize_name("email"), "Email");
        assert_eq!(humanize_name("SHOUTY_NAME"), "Shouty Name");
    }

    #[test]
    fn humanize_collapses_empty_segments() {
        assert_eq!(humanize_name("a__b"), "A B");
        assert_eq!(humanize_name(""), "");
    }

    #[test]
    fn parse_maps_known_tags_and_defaults_to_text() {
        assert_eq!(FieldType::parse("email"), FieldType::Email);
        assert_eq!(FieldType::parse("SELECT-ONE"), FieldType::Select);
        assert_eq!(FieldType::parse("phone"), FieldType::Tel);
        assert_eq!(FieldType::parse("password"), FieldType::Text);
        assert_eq!(FieldType::parse(""), FieldType::Text);
    }

    #[test]
    fn display_label_prefers_source_label() {
        let with = FieldDescriptor::new("email", FieldType::Text).with_label("Work Email");
        assert_eq!(with.display_label(), "Work Email");

        let without = FieldDescriptor::new("contact_phone", FieldType::Tel);
        assert_eq!(without.display_label(), "Contact Phone");
    }

    #[test]
    fn descriptor_serializes_type_under_type_key() {
        let d = FieldDescriptor::new("age", FieldType::Text);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "text");
        assert!(json.get("label").is_none());
    }
}
