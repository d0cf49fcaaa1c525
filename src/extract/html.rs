//! HTML field extraction: structured client data or raw-markup heuristics.
//!
//! Two mutually exclusive strategies produce the same descriptor list:
//!
//! 1. **Structured path** — a client-side collaborator (browser extension
//!    content script) already walked the live DOM and sends
//!    [`StructuredForm`] records. These are authoritative; flattening them
//!    is pure bookkeeping.
//! 2. **Heuristic path** — no structured data, so an ordered list of regex
//!    matchers scans the raw markup for text-like inputs, text areas, and
//!    selection controls, then hunts for a human-readable label near each
//!    hit.
//!
//! Regex over HTML is acceptable here because the rules are independent,
//! each is unit-testable in isolation, and a miss only costs a field its
//! nice label — the humanized name always stands in. The extractor never
//! errors; an empty result means "no usable form".

use crate::fields::{humanize_name, FieldDescriptor, FieldType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One form as described by the client-side collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredForm {
    #[serde(default)]
    pub fields: Vec<StructuredField>,
}

/// One field as described by the client-side collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Extract the ordered, de-duplicated field list from an HTML fragment.
///
/// Non-empty `forms` data takes the structured path; otherwise the raw
/// markup is scanned heuristically. First occurrence of a `name` wins in
/// both paths.
pub fn extract_fields(html: &str, forms: Option<&[StructuredForm]>) -> Vec<FieldDescriptor> {
    let fields = match forms {
        Some(forms) if !forms.is_empty() => flatten_structured(forms),
        _ => extract_heuristic(html),
    };
    info!("extracted {} fields from website form", fields.len());
    fields
}

// ── Structured path ──────────────────────────────────────────────────────

fn flatten_structured(forms: &[StructuredForm]) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::new();
    for form in forms {
        for field in &form.fields {
            if field.name.is_empty() || fields.iter().any(|f| f.name == field.name) {
                continue;
            }
            let field_type = field
                .field_type
                .as_deref()
                .map(FieldType::parse)
                .unwrap_or_default();
            let label = field
                .label
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| field.name.clone());
            fields.push(FieldDescriptor::new(&field.name, field_type).with_label(label));
        }
    }
    fields
}

// ── Heuristic path ───────────────────────────────────────────────────────

static RE_TEXT_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<input[^>]*\bname=["']([^"']+)["'][^>]*>"#).unwrap());

static RE_TEXTAREA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<textarea[^>]*\bname=["']([^"']+)["']"#).unwrap());

static RE_SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<select[^>]*\bname=["']([^"']+)["']"#).unwrap());

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// The ordered matcher table. Each rule is independent; a field claimed by
/// an earlier rule is skipped by later ones (first occurrence wins).
static MATCHERS: [(&Lazy<Regex>, FieldType); 3] = [
    (&RE_TEXT_INPUT, FieldType::Text),
    (&RE_TEXTAREA, FieldType::Textarea),
    (&RE_SELECT, FieldType::Select),
];

fn extract_heuristic(html: &str) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::new();
    for (pattern, field_type) in MATCHERS.iter() {
        for caps in pattern.captures_iter(html) {
            let name = &caps[1];
            if fields.iter().any(|f| f.name == name) {
                continue;
            }
            let label = discover_label(html, name).unwrap_or_else(|| humanize_name(name));
            fields.push(FieldDescriptor::new(name, *field_type).with_label(label));
        }
    }
    fields
}

/// Find a human-readable label for `name`, in priority order:
/// an explicit `<label for=…>`, then a label/span/div immediately preceding
/// the input. `None` means the caller should humanize the raw name.
///
/// Never fails — an unbuildable pattern (impossible after escaping) just
/// skips that tier.
fn discover_label(html: &str, name: &str) -> Option<String> {
    let escaped = regex::escape(name);

    // (a) <label for="...name...">Label text</label>
    let for_pattern = format!(
        r#"(?is)<label[^>]*\bfor=["'][^"']*{escaped}[^"']*["'][^>]*>(.*?)</label>"#
    );
    if let Ok(re) = Regex::new(&for_pattern) {
        if let Some(caps) = re.captures(html) {
            let text = strip_tags(&caps[1]);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    // (b) nearby text: a label/span/div directly before the input tag
    let nearby_pattern = format!(
        r#"(?i)(?:<label[^>]*>|<span[^>]*>|<div[^>]*>)([^<]*)</(?:label|span|div)>[^<]*<input[^>]*\bname=["']{escaped}["']"#
    );
    if let Ok(re) = Regex::new(&nearby_pattern) {
        if let Some(caps) = re.captures(html) {
            let text = caps[1].trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    debug!("no label markup found for field '{name}'");
    None
}

fn strip_tags(markup: &str) -> String {
    RE_TAG.replace_all(markup, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_rule_collects_names_in_order() {
        let html = r#"<input name="first"><input type="email" name="second">"#;
        let fields = extract_fields(html, None);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "first");
        assert_eq!(fields[1].name, "second");
        // heuristic inputs are always coarse text
        assert_eq!(fields[1].field_type, FieldType::Text);
    }

    #[test]
    fn textarea_and_select_rules_set_their_types() {
        let html = r#"<textarea name="bio"></textarea><select name="country"></select>"#;
        let fields = extract_fields(html, None);
        assert_eq!(fields[0].field_type, FieldType::Textarea);
        assert_eq!(fields[1].field_type, FieldType::Select);
    }

    #[test]
    fn duplicate_names_keep_first_occurrence() {
        let html = r#"
            <label for="email">Work Email</label><input name="email">
            <textarea name="email"></textarea>
        "#;
        let fields = extract_fields(html, None);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Text);
        assert_eq!(fields[0].label.as_deref(), Some("Work Email"));
    }

    #[test]
    fn for_label_beats_adjacent_text() {
        let html = r#"
            <label for="city">City of Residence</label>
            <span>Where you live</span><input name="city">
        "#;
        let fields = extract_fields(html, None);
        assert_eq!(fields[0].label.as_deref(), Some("City of Residence"));
    }

    #[test]
    fn adjacent_text_used_when_no_for_label() {
        let html = r#"<span>Phone number</span> <input name="phone">"#;
        let fields = extract_fields(html, None);
        assert_eq!(fields[0].label.as_deref(), Some("Phone number"));
    }

    #[test]
    fn label_markup_is_stripped() {
        let html = r#"<label for="age"><b>Your</b> age</label><input name="age">"#;
        let fields = extract_fields(html, None);
        assert_eq!(fields[0].label.as_deref(), Some("Your age"));
    }

    #[test]
    fn unlabeled_field_gets_humanized_name() {
        let html = r#"<input name="email" type="email">"#;
        let fields = extract_fields(html, None);
        assert_eq!(fields[0].label.as_deref(), Some("Email"));
    }

    #[test]
    fn structured_data_takes_precedence_over_markup() {
        let forms = vec![StructuredForm {
            fields: vec![
                StructuredField {
                    name: "email".into(),
                    field_type: Some("email".into()),
                    label: Some("Email Address".into()),
                },
                StructuredField {
                    name: "email".into(),
                    field_type: Some("text".into()),
                    label: Some("Duplicate".into()),
                },
            ],
        }];
        let fields = extract_fields("<input name='ignored'>", Some(&forms));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Email);
        assert_eq!(fields[0].label.as_deref(), Some("Email Address"));
    }

    #[test]
    fn empty_structured_list_falls_back_to_markup() {
        let fields = extract_fields("<input name='kept'>", Some(&[]));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "kept");
    }

    #[test]
    fn formless_markup_yields_empty_list() {
        assert!(extract_fields("<p>nothing to fill here</p>", None).is_empty());
    }
}
