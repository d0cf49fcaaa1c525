//! # form2chat
//!
//! Turn static forms into conversations. Give the crate a PDF with fillable
//! fields or the HTML of a web form; it recovers the field list, asks one
//! natural-language question per field, and re-materializes the answers into
//! a completed artifact — a filled PDF, or a name→value mapping ready to
//! inject into the page.
//!
//! ## Why this crate?
//!
//! Official forms are hostile interfaces: cryptic field names, no guidance,
//! all-at-once. Walking the same fields as a linear interview — with a
//! language model phrasing each question and a deterministic template
//! standing in whenever the model is unavailable — turns form-filling into
//! something a person (or a chat frontend) can finish without reading the
//! form at all.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes / HTML
//!  │
//!  ├─ 1. Extract   AcroForm walk or markup heuristics → ordered field list
//!  ├─ 2. Register  session (uuid key) in the owned SessionRegistry
//!  ├─ 3. Interview cursor walks the fields; one question per advance
//!  │                (model call with template fallback, never fails)
//!  └─ 4. Drain     answers → filled PDF / field-value mapping; session gone
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use form2chat::{interview, InterviewConfig, InterviewStep, QuestionGenerator, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SessionRegistry::new();
//!     // No API key configured: questions come from the deterministic templates.
//!     let generator = QuestionGenerator::new(InterviewConfig::from_env());
//!
//!     let bytes = std::fs::read("application_form.pdf")?;
//!     let summary = interview::create_pdf_session(&registry, bytes)?;
//!
//!     let mut question = interview::start_session(&registry, &generator, &summary.id).await?;
//!     loop {
//!         println!("[{}/{}] {}", question.current, question.total, question.text);
//!         let answer = read_answer_somehow();
//!         match interview::advance_session(&registry, &generator, &summary.id, Some(answer)).await? {
//!             InterviewStep::Question(next) => question = next,
//!             InterviewStep::Complete { .. } => break,
//!         }
//!     }
//!
//!     let completed = interview::complete_pdf_session(&registry, &summary.id).await?;
//!     std::fs::write("completed_form.pdf", completed)?;
//!     Ok(())
//! }
//! # fn read_answer_somehow() -> String { String::new() }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `form2chat` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! form2chat = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod interview;
pub mod prompts;
pub mod question;
pub mod registry;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{InterviewConfig, InterviewConfigBuilder};
pub use error::{Form2ChatError, QuestionError};
pub use extract::html::{StructuredField, StructuredForm};
pub use fields::{humanize_name, FieldDescriptor, FieldType, SourceKind};
pub use interview::{InterviewStep, SessionSummary};
pub use question::{GeneratedQuestion, QuestionGenerator, QuestionSource};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{FieldPrompt, Question, Session, SourcePayload, Step};
