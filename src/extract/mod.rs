//! Field extraction from the two supported source formats.
//!
//! Both submodules produce the same thing — an ordered
//! `Vec<FieldDescriptor>` — from structurally different inputs:
//!
//! 1. [`pdf`]  — walks the document's AcroForm dictionary; also provides
//!    page-text extraction (question context) and best-effort field filling
//! 2. [`html`] — flattens structured client-side form data when supplied,
//!    otherwise runs an ordered list of regex matchers over raw markup with
//!    a nearby-text label heuristic
//!
//! Neither extractor ever errors: malformed input degrades to an empty
//! list, which callers treat as "no usable form".

pub mod html;
pub mod pdf;
