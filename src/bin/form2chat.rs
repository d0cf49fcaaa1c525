//! CLI binary for form2chat.
//!
//! A thin shim over the library crate: `inspect` lists the fields a source
//! document would produce, `interview` runs the full conversational loop on
//! the terminal and writes the completed artifact.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use form2chat::{
    interview, FieldDescriptor, InterviewConfig, InterviewStep, QuestionGenerator,
    SessionRegistry, SourceKind,
};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # List the fillable fields of a form (no API key needed)
  form2chat inspect application.pdf

  # Interactive interview; writes completed_form.pdf next to the input
  form2chat interview application.pdf

  # Model-phrased questions via OpenRouter
  OPENROUTER_API_KEY=sk-... form2chat interview application.pdf

  # Generate all questions up front, then interview offline
  form2chat interview --pregenerate application.pdf

  # HTML form: interview and dump the field values as JSON
  form2chat interview signup.html --answers-json values.json

ENVIRONMENT VARIABLES:
  FORM2CHAT_API_KEY    Question-generation credential (preferred)
  OPENROUTER_API_KEY   Fallback credential variable
  FORM2CHAT_MODEL      Override the model ID

Without a credential every question comes from the built-in templates —
the interview still works end to end, just with plainer phrasing.
"#;

/// Turn PDF and web forms into conversational interviews.
#[derive(Parser, Debug)]
#[command(
    name = "form2chat",
    version,
    about = "Turn PDF and web forms into conversational interviews",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the fillable fields a document would produce, without starting
    /// an interview.
    Inspect {
        /// PDF or HTML file.
        input: PathBuf,
    },

    /// Run the interview on the terminal and write the completed artifact.
    Interview {
        /// PDF or HTML file.
        input: PathBuf,

        /// Where to write the completed PDF (PDF sources only).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the collected answers as JSON.
        #[arg(long)]
        answers_json: Option<PathBuf>,

        /// Generate every question concurrently before asking the first one.
        #[arg(long)]
        pregenerate: bool,

        /// Question-generation credential.
        #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model ID for question generation.
        #[arg(long, env = "FORM2CHAT_MODEL")]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Inspect { input } => inspect(&input),
        Command::Interview {
            input,
            output,
            answers_json,
            pregenerate,
            api_key,
            model,
        } => {
            let mut config = InterviewConfig::from_env();
            if api_key.is_some() {
                config.api_key = api_key.filter(|k| !k.is_empty());
            }
            if let Some(model) = model {
                config.model = model;
            }
            run_interview(&input, output, answers_json, pregenerate, config).await
        }
    }
}

// ── inspect ──────────────────────────────────────────────────────────────────

fn inspect(input: &Path) -> Result<()> {
    let registry = SessionRegistry::new();
    let summary = create_session(&registry, input)?;

    println!(
        "{} {}",
        cyan("◆"),
        bold(&format!("{} fillable fields", summary.total_fields))
    );
    for (i, field) in summary.fields.iter().enumerate() {
        println!(
            "  {:>3}. {:<28} {:<10} {}",
            i + 1,
            field.name,
            field.field_type,
            dim(&field.label.clone().unwrap_or_default()),
        );
    }
    registry.remove(&summary.id);
    Ok(())
}

// ── interview ────────────────────────────────────────────────────────────────

async fn run_interview(
    input: &Path,
    output: Option<PathBuf>,
    answers_json: Option<PathBuf>,
    pregenerate: bool,
    config: InterviewConfig,
) -> Result<()> {
    let registry = SessionRegistry::new();
    let generator = QuestionGenerator::new(config);
    let summary = create_session(&registry, input)?;
    let kind = source_kind(input);

    if !generator.config().has_model() {
        eprintln!(
            "{}",
            dim("no API key configured — questions come from templates")
        );
    }
    eprintln!(
        "{} {}",
        cyan("◆"),
        bold(&format!(
            "Starting interview: {} fields to fill",
            summary.total_fields
        ))
    );

    let answers = if pregenerate {
        interview_pregenerated(&registry, &generator, &summary.id, &summary.fields).await?
    } else {
        interview_stepwise(&registry, &generator, &summary.id).await?
    };

    if let Some(path) = &answers_json {
        let json = serde_json::to_string_pretty(&answers)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("{} answers written to {}", green("✔"), path.display());
    }

    match kind {
        SourceKind::Pdf => {
            let completed = interview::complete_pdf_session(&registry, &summary.id).await?;
            let path = output.unwrap_or_else(|| PathBuf::from("completed_form.pdf"));
            std::fs::write(&path, completed)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{} completed PDF written to {}",
                green("✔"),
                bold(&path.display().to_string())
            );
        }
        SourceKind::Website => {
            let values = interview::website_field_values(&registry, &summary.id).await?;
            registry.remove(&summary.id);
            if answers_json.is_none() {
                println!("{}", serde_json::to_string_pretty(&values)?);
            }
            eprintln!(
                "{} {} field values collected",
                green("✔"),
                bold(&values.len().to_string())
            );
        }
    }
    Ok(())
}

/// Default mode: one question-generation call per advance.
async fn interview_stepwise(
    registry: &SessionRegistry,
    generator: &QuestionGenerator,
    id: &str,
) -> Result<HashMap<String, String>> {
    let mut question = interview::start_session(registry, generator, id).await?;
    loop {
        let answer = ask(&question.text, &question.explanation, question.current, question.total)?;
        match interview::advance_session(registry, generator, id, Some(answer)).await? {
            InterviewStep::Question(next) => question = next,
            InterviewStep::Complete { answers } => return Ok(answers),
        }
    }
}

/// `--pregenerate`: all questions are produced concurrently up front, then
/// the session is walked with no further network calls.
async fn interview_pregenerated(
    registry: &SessionRegistry,
    generator: &QuestionGenerator,
    id: &str,
    fields: &[FieldDescriptor],
) -> Result<HashMap<String, String>> {
    let handle = registry.get(id)?;
    let mut session = handle.lock().await;

    eprintln!("{}", dim("pre-generating questions…"));
    let questions = generator.generate_all(fields, session.context()).await;
    let by_name: HashMap<&str, &form2chat::GeneratedQuestion> = questions
        .iter()
        .map(|q| (q.field_name.as_str(), q))
        .collect();

    let mut prompt = session.start()?;
    loop {
        let (text, explanation) = match by_name.get(prompt.field.name.as_str()) {
            Some(q) => (q.question.clone(), q.explanation.clone()),
            None => (format!("What should we enter for {}?", prompt.field.name), String::new()),
        };
        let answer = ask(&text, &explanation, prompt.current, prompt.total)?;
        match session.advance(Some(answer)) {
            form2chat::Step::Ask(next) => prompt = next,
            form2chat::Step::Complete => return Ok(session.answers().clone()),
        }
    }
}

/// Print one question and read the answer from stdin.
fn ask(text: &str, explanation: &str, current: usize, total: usize) -> Result<String> {
    println!();
    println!("{} {}", cyan(&format!("[{current}/{total}]")), bold(text));
    if !explanation.is_empty() {
        println!("        {}", dim(explanation));
    }
    print!("      > ");
    io::stdout().flush()?;

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer)? == 0 {
        bail!("stdin closed before the interview finished");
    }
    Ok(answer.trim_end_matches(['\n', '\r']).to_string())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn source_kind(input: &Path) -> SourceKind {
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
            SourceKind::Website
        }
        _ => SourceKind::Pdf,
    }
}

fn create_session(
    registry: &SessionRegistry,
    input: &Path,
) -> Result<form2chat::SessionSummary> {
    let bytes =
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let summary = match source_kind(input) {
        SourceKind::Pdf => {
            if !bytes.starts_with(b"%PDF") {
                bail!(
                    "{} does not look like a PDF (missing %PDF header)",
                    input.display()
                );
            }
            interview::create_pdf_session(registry, bytes)?
        }
        SourceKind::Website => {
            let html = String::from_utf8(bytes)
                .with_context(|| format!("{} is not valid UTF-8", input.display()))?;
            // The CLI has no client-side collaborator, so the heuristic
            // path always runs.
            interview::create_website_session(registry, html, None)?
        }
    };
    Ok(summary)
}
