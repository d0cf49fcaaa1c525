//! AcroForm field extraction, page text, and best-effort form filling.
//!
//! Everything here is deliberately failure-tolerant: a PDF that cannot be
//! parsed, an AcroForm entry that dangles, a page whose content stream is
//! broken — each degrades to "nothing extracted from that part" rather than
//! an error. The caller's contract is a field list that may be empty, text
//! that may be empty, and a fill that at worst returns the input unchanged.
//!
//! ## Field tree walking
//!
//! AcroForm fields form a tree: `/AcroForm → /Fields → [refs]`, where each
//! node may carry a partial name (`/T`), a field type (`/FT`, inheritable),
//! and child nodes (`/Kids`). A node whose kids carry their own `/T` is a
//! grouping node — recurse, joining names with `.` the way fully-qualified
//! AcroForm names are spelled. A node whose kids are bare widgets is itself
//! the field; its object holds the value on fill.

use crate::fields::{FieldDescriptor, FieldType};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Maximum field-tree depth; anything deeper is a malformed or adversarial
/// document.
const MAX_TREE_DEPTH: usize = 16;

/// Extract the ordered list of fillable fields from raw PDF bytes.
///
/// Never errors: malformed, encrypted, or form-less documents all yield an
/// empty list ("no fillable fields", not a failure).
pub fn extract_fields(bytes: &[u8]) -> Vec<FieldDescriptor> {
    let nodes = match Document::load_mem(bytes) {
        Ok(doc) => collect_field_nodes(&doc),
        Err(e) => {
            debug!("PDF load failed during field extraction: {e}");
            Vec::new()
        }
    };

    let mut fields: Vec<FieldDescriptor> = Vec::new();
    for node in nodes {
        if fields.iter().any(|f| f.name == node.name) {
            continue;
        }
        fields.push(FieldDescriptor::new(node.name, node.field_type));
    }
    info!("extracted {} AcroForm fields", fields.len());
    fields
}

/// Concatenate the text of every page, page-ordered, with `--- Page N ---`
/// headers.
///
/// A page whose text cannot be extracted contributes nothing; total failure
/// yields an empty string. Used as contextual grounding for question
/// generation, so lossiness is acceptable.
pub fn extract_text(bytes: &[u8]) -> String {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("PDF load failed during text extraction: {e}");
            return String::new();
        }
    };

    let mut sections: Vec<String> = Vec::new();
    for &page_num in doc.get_pages().keys() {
        match doc.extract_text(&[page_num]) {
            Ok(text) if !text.trim().is_empty() => {
                sections.push(format!("--- Page {page_num} ---\n{}", text.trim_end()));
            }
            Ok(_) => {}
            Err(e) => debug!("page {page_num}: text extraction failed: {e}"),
        }
    }

    let full = sections.join("\n\n");
    info!("extracted {} characters of page text", full.len());
    full
}

/// Apply `answers` onto matching form fields, best-effort.
///
/// Every page is carried over unchanged; only field values are touched. On
/// any internal failure the original bytes come back unmodified — filling
/// never propagates an error.
pub fn fill(bytes: &[u8], answers: &HashMap<String, String>) -> Vec<u8> {
    match try_fill(bytes, answers) {
        Ok(filled) => filled,
        Err(e) => {
            warn!("PDF fill degraded to passthrough: {e}");
            bytes.to_vec()
        }
    }
}

/// Fallible core of [`fill`], also used by the orchestration layer to
/// report artifact failures explicitly instead of silently passing the
/// original document through.
pub(crate) fn try_fill(
    bytes: &[u8],
    answers: &HashMap<String, String>,
) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::load_mem(bytes)?;
    let nodes = collect_field_nodes(&doc);

    let mut applied = 0usize;
    for node in &nodes {
        let (Some(id), Some(value)) = (node.id, answers.get(&node.name)) else {
            continue;
        };
        // A field the document dropped between walks is skipped, not fatal.
        let Ok(dict) = doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
        else {
            continue;
        };
        match node.field_type {
            FieldType::Checkbox => {
                let state: &[u8] = if is_truthy(value) { b"Yes" } else { b"Off" };
                dict.set("V", Object::Name(state.to_vec()));
                dict.set("AS", Object::Name(state.to_vec()));
            }
            _ => {
                dict.set("V", Object::string_literal(value.as_str()));
            }
        }
        applied += 1;
    }

    // Viewers regenerate widget appearances from /V instead of showing the
    // stale (empty) appearance streams.
    set_need_appearances(&mut doc)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    debug!("filled {applied}/{} fields", nodes.len());
    Ok(out)
}

// ── Field tree walk ──────────────────────────────────────────────────────

/// A terminal field node: the object that carries the name and, on fill,
/// receives the value.
struct FieldNode {
    id: Option<ObjectId>,
    name: String,
    field_type: FieldType,
}

/// Walk `/AcroForm → /Fields`, collecting terminal fields in document order.
fn collect_field_nodes(doc: &Document) -> Vec<FieldNode> {
    let mut nodes = Vec::new();
    let Ok(catalog) = doc.catalog() else {
        return nodes;
    };
    let Some(acroform) = catalog
        .get(b"AcroForm")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
    else {
        debug!("document has no AcroForm dictionary");
        return nodes;
    };
    let Some(roots) = acroform
        .get(b"Fields")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_array().ok())
    else {
        return nodes;
    };

    for root in roots {
        visit_field(doc, root, None, None, 0, &mut nodes);
    }
    nodes
}

fn visit_field(
    doc: &Document,
    obj: &Object,
    prefix: Option<&str>,
    inherited: Option<FieldType>,
    depth: usize,
    out: &mut Vec<FieldNode>,
) {
    if depth > MAX_TREE_DEPTH {
        return;
    }
    let id = match obj {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    let Ok(dict) = resolve(doc, obj).as_dict() else {
        return;
    };

    let partial = dict
        .get(b"T")
        .ok()
        .and_then(|o| decode_text(resolve(doc, o)));
    let qualified = match (prefix, partial) {
        (Some(p), Some(t)) => Some(format!("{p}.{t}")),
        (Some(p), None) => Some(p.to_string()),
        (None, Some(t)) => Some(t),
        (None, None) => None,
    };

    let field_type = dict
        .get(b"FT")
        .ok()
        .and_then(|o| match resolve(doc, o) {
            Object::Name(tag) => Some(field_type_from_tag(tag)),
            _ => None,
        })
        .or(inherited);

    let kids = dict
        .get(b"Kids")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok());

    // Kids that carry their own /T are sub-fields; bare kids are widget
    // annotations of this field and the value belongs here.
    let named_kids = kids.is_some_and(|arr| {
        arr.iter().any(|kid| {
            resolve(doc, kid)
                .as_dict()
                .map(|d| d.has(b"T"))
                .unwrap_or(false)
        })
    });

    if named_kids {
        if let Some(arr) = kids {
            for kid in arr {
                visit_field(doc, kid, qualified.as_deref(), field_type, depth + 1, out);
            }
        }
    } else if let Some(name) = qualified {
        out.push(FieldNode {
            id,
            name,
            field_type: field_type.unwrap_or_default(),
        });
    }
}

/// Map an AcroForm `/FT` tag to the coarse field type.
fn field_type_from_tag(tag: &[u8]) -> FieldType {
    match tag {
        b"Tx" => FieldType::Text,
        b"Btn" => FieldType::Checkbox,
        b"Ch" => FieldType::Choice,
        _ => FieldType::Text,
    }
}

/// Follow references to the pointed-at object, bounded against cycles.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..MAX_TREE_DEPTH {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

/// Decode a PDF text string. UTF-16BE (BOM-prefixed) strings appear in
/// field names written by common authoring tools.
fn decode_text(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1" | "x" | "checked"
    )
}

fn set_need_appearances(doc: &mut Document) -> Result<(), lopdf::Error> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    // AcroForm may be inline in the catalog or an indirect object.
    let acroform_id = doc
        .get_object(root_id)?
        .as_dict()?
        .get(b"AcroForm")?
        .as_reference();
    match acroform_id {
        Ok(id) => {
            doc.get_object_mut(id)?
                .as_dict_mut()?
                .set("NeedAppearances", true);
        }
        Err(_) => {
            let catalog = doc.get_object_mut(root_id)?.as_dict_mut()?;
            if let Ok(Object::Dictionary(acroform)) = catalog.get_mut(b"AcroForm") {
                acroform.set("NeedAppearances", true);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_map_covers_the_three_acroform_kinds() {
        assert_eq!(field_type_from_tag(b"Tx"), FieldType::Text);
        assert_eq!(field_type_from_tag(b"Btn"), FieldType::Checkbox);
        assert_eq!(field_type_from_tag(b"Ch"), FieldType::Choice);
        assert_eq!(field_type_from_tag(b"Sig"), FieldType::Text);
    }

    #[test]
    fn garbage_bytes_degrade_to_empty() {
        assert!(extract_fields(b"not a pdf at all").is_empty());
        assert_eq!(extract_text(b"not a pdf at all"), "");
    }

    #[test]
    fn fill_on_garbage_returns_input_unchanged() {
        let mut answers = HashMap::new();
        answers.insert("name".to_string(), "Jane".to_string());
        assert_eq!(fill(b"junk", &answers), b"junk".to_vec());
    }

    #[test]
    fn utf16_field_names_decode() {
        let raw = Object::String(
            vec![0xFE, 0xFF, 0x00, b'h', 0x00, b'i'],
            lopdf::StringFormat::Literal,
        );
        assert_eq!(decode_text(&raw).as_deref(), Some("hi"));
    }

    #[test]
    fn truthy_checkbox_values() {
        assert!(is_truthy("true"));
        assert!(is_truthy(" Yes "));
        assert!(is_truthy("X"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("Jane Doe"));
    }
}
