//! CLI binary for resume-revamp.
//!
//! A thin shim over the library: flags become session events, the session
//! runs to an editable record, and the requested outputs are written.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume_revamp::export::ExportKind;
use resume_revamp::ingest::input::is_url;
use resume_revamp::template::html::to_html;
use resume_revamp::{
    apply, EditCommand, Event, ExportOutcome, Phase, Rejection, RenderMode, ResumeRecord,
    RevampConfig, SessionObserver, SessionRuntime, SessionState, Template,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Spinner while the session reads and extracts, then one log line per
/// export. There is no real progress signal from the model, so no bar.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Revamp");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Print above the spinner, or plainly once it has finished.
    fn log(&self, line: String) {
        self.bar.suspend(|| eprintln!("{line}"));
    }
}

impl SessionObserver for CliObserver {
    fn on_phase_change(&self, _from: &Phase, to: &Phase) {
        match to {
            Phase::Reading { .. } | Phase::Extracting { .. } => {
                self.bar
                    .set_message(to.status_message().unwrap_or_default().to_string());
            }
            Phase::Editable | Phase::Error { .. } | Phase::Idle => self.bar.finish_and_clear(),
        }
    }

    fn on_record_change(&self, record: &ResumeRecord) {
        self.log(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&record.full_name),
            dim(&format!(
                "{} positions · {} skills",
                record.experience.len(),
                record.skills.len()
            )),
        ));
    }

    fn on_rejected(&self, rejection: &Rejection) {
        self.log(format!("  {} {}", red("✗"), rejection));
    }

    fn on_export_start(&self, kind: ExportKind) {
        self.log(format!("  {} Generating {}…", dim("·"), kind));
    }

    fn on_export_complete(&self, kind: ExportKind, bytes: usize) {
        self.log(format!(
            "  {} {} {}",
            green("✓"),
            kind,
            dim(&format!("{bytes} bytes"))
        ));
    }

    fn on_export_error(&self, kind: ExportKind, error: &str) {
        // Long pdfium errors wrap badly in a terminal.
        let msg = match error.lines().next() {
            Some(first) if first.chars().count() > 80 => {
                format!("{}\u{2026}", first.chars().take(79).collect::<String>())
            }
            Some(first) => first.to_string(),
            None => String::new(),
        };
        self.log(format!("  {} {}  {}", red("✗"), kind, red(&msg)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a PDF resume and export both formats
  revamp resume.pdf --pdf --docx

  # Tailor to a job description, pick a template, preview as HTML
  revamp resume.pdf --job-description-file jd.txt --template ats-optimized --html cv.html

  # Paste text from stdin
  pbpaste | revamp --text - --json > resume.json

  # Try the templates without an API key
  revamp --sample --template strategic-hybrid --pdf --out-dir out/

  # Edit before exporting
  revamp --sample --edit 'fullName=Sam Lee' --edit 'skills[0]-' \
         --edit 'experience[0].description=Led X\nShipped Y' --docx

EDITS (--edit, repeatable, applied in order):
  fullName=V | jobTitle=V | summary=V
  contact.email=V   (also phone, location, linkedin, website)
  skills[i]=V | skills+ | skills[i]-
  experience[i].role=V   (company, dates, location, description)
  experience+ | experience[i]-
  education[i].degree=V  (school, dates, location)
  education+ | education[i]-
  projects[i].name=V     (description, link)
  projects+ | projects[i]-
  In a description, \n starts a new bullet and \\ is a literal backslash.

TEMPLATES:
  Run `revamp --list-templates`. Templates without a layout render a
  "Template Not Implemented Yet" notice.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips auto-download

  PDFium (~30 MB) is downloaded on first use and cached. It is needed for
  PDF input and for --pdf.
"#;

/// Revamp a resume with an LLM and export it as PDF or DOCX.
#[derive(Parser, Debug)]
#[command(
    name = "revamp",
    version,
    about = "Revamp a resume with an LLM and export it as PDF or DOCX",
    long_about = "Read a resume (PDF, image, or text), let a language model turn it into a \
structured record (optionally tailored to a job description), apply edits, render it with a \
template, and export a page-image PDF or an editable DOCX.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Resume file (PDF, PNG, JPEG, text) or HTTP/HTTPS URL.
    #[arg(conflicts_with_all = ["text", "sample"])]
    input: Option<String>,

    /// Submit the contents of this text file as a pasted resume ("-" for stdin).
    #[arg(long, value_name = "FILE", conflicts_with = "sample")]
    text: Option<String>,

    /// Load the built-in sample resume (no model call).
    #[arg(long)]
    sample: bool,

    /// Target job description text.
    #[arg(long, env = "REVAMP_JOB_DESCRIPTION", conflicts_with = "job_description_file")]
    job_description: Option<String>,

    /// Read the target job description from a file.
    #[arg(long, value_name = "FILE")]
    job_description_file: Option<PathBuf>,

    /// Template id or display name.
    #[arg(short, long, env = "REVAMP_TEMPLATE", default_value = "software-engineer")]
    template: String,

    /// Render in print mode (no page padding, no minimum height).
    #[arg(long)]
    print: bool,

    /// Edit to apply before output (repeatable, see EDITS below).
    #[arg(short, long = "edit", value_name = "EDIT")]
    edits: Vec<String>,

    /// Write an HTML preview to this file.
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,

    /// Export a page-image PDF.
    #[arg(long)]
    pdf: bool,

    /// Export an editable DOCX.
    #[arg(long)]
    docx: bool,

    /// Directory for exported files.
    #[arg(short, long, env = "REVAMP_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Print the final record as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// List the template catalogue and exit.
    #[arg(long)]
    list_templates: bool,

    /// LLM model ID (e.g. gpt-4.1-mini, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "REVAMP_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Rendering DPI for PDF input (72–400).
    #[arg(long, env = "REVAMP_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Max LLM output tokens.
    #[arg(long, env = "REVAMP_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "REVAMP_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// PDF export resolution multiplier (1–4).
    #[arg(long, env = "REVAMP_EXPORT_SCALE", default_value_t = 2.0)]
    export_scale: f32,

    /// TrueType font to embed in the PDF export (needed for non-Latin text).
    #[arg(long, env = "REVAMP_EXPORT_FONT", value_name = "TTF")]
    export_font: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "REVAMP_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// LLM call timeout in seconds (default: wait for the provider).
    #[arg(long, env = "REVAMP_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Disable the spinner.
    #[arg(long, env = "REVAMP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REVAMP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "REVAMP_QUIET")]
    quiet: bool,
}

impl Cli {
    fn render_mode(&self) -> RenderMode {
        if self.print {
            RenderMode::Print
        } else {
            RenderMode::Screen
        }
    }

    fn export_kinds(&self) -> Vec<ExportKind> {
        let mut kinds = Vec::new();
        if self.pdf {
            kinds.push(ExportKind::Pdf);
        }
        if self.docx {
            kinds.push(ExportKind::Docx);
        }
        kinds
    }

    /// PDF input or PDF output both go through pdfium.
    fn needs_pdfium(&self) -> bool {
        self.pdf
            || self.input.as_deref().is_some_and(|input| {
                is_url(input) || input.to_ascii_lowercase().ends_with(".pdf")
            })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; library INFO lines
    // would tear it.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_templates {
        for template in Template::CATALOGUE {
            let marker = if template.is_implemented() {
                green("●")
            } else {
                dim("○")
            };
            println!("{} {:<24} {}", marker, template.id(), template.display_name());
        }
        return Ok(());
    }

    let ingest = ingestion_event(&cli).await?;
    let edits = parse_edits(&cli.edits)?;

    if cli.needs_pdfium() {
        ensure_pdfium(cli.quiet)?;
    }

    // ── Session ──────────────────────────────────────────────────────────
    let config = build_config(&cli).await?;
    let mut runtime = SessionRuntime::from_config(&config);
    if show_progress {
        runtime = runtime.observer(CliObserver::new());
    }
    let session = runtime.spawn();

    if let Some(jd) = job_description(&cli).await? {
        session.dispatch(Event::JobDescriptionChanged(jd))?;
    }
    session.dispatch(ingest)?;

    let state = session
        .wait_for(|s| s.record.is_some() || matches!(s.phase, Phase::Error { .. }))
        .await?;
    let Some(record) = state.record() else {
        let message = state.phase.status_message().unwrap_or_default();
        anyhow::bail!("{message}\nRun with --verbose for the underlying cause.");
    };

    // Edits are checked against a local copy first so a bad index fails the
    // run instead of being silently rejected by the session.
    let expected = edits
        .iter()
        .try_fold(record.clone(), |current, edit| apply(&current, edit))
        .context("Edit could not be applied")?;

    let template: Template = cli.template.parse().unwrap_or_default();
    let mode = cli.render_mode();
    session.dispatch(Event::TemplateSelected(template.clone()))?;
    session.dispatch(Event::RenderModeChanged(mode))?;
    for edit in edits {
        session.dispatch(Event::Edit(edit))?;
    }
    let state = session
        .wait_for(|s| {
            s.record() == Some(&expected) && s.template == template && s.render_mode == mode
        })
        .await?;

    write_outputs(&cli, &state)?;

    // ── Exports ──────────────────────────────────────────────────────────
    let kinds = cli.export_kinds();
    if !kinds.is_empty() {
        tokio::fs::create_dir_all(&cli.out_dir)
            .await
            .with_context(|| format!("Failed to create {}", cli.out_dir.display()))?;
    }
    for kind in &kinds {
        session.dispatch(Event::ExportRequested(*kind))?;
    }

    let mut failures = Vec::new();
    for _ in &kinds {
        match session.next_export().await {
            Some(ExportOutcome::Finished(artifact)) => {
                let path = cli.out_dir.join(&artifact.filename);
                tokio::fs::write(&path, &artifact.bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                if !cli.quiet {
                    eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
                }
            }
            Some(ExportOutcome::Failed { kind, reason }) => {
                failures.push(format!("{}\n  {}", kind.failure_message(), dim(&reason)));
            }
            None => anyhow::bail!("Session stopped before the exports finished"),
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{} {}", red("✘"), failure);
        }
        anyhow::bail!("{} export(s) failed", failures.len());
    }

    Ok(())
}

/// Turn the source flags into the event that starts ingestion.
async fn ingestion_event(cli: &Cli) -> Result<Event> {
    if cli.sample {
        return Ok(Event::SampleRequested);
    }
    if let Some(ref source) = cli.text {
        let text = read_text_arg(source).await?;
        if text.trim().is_empty() {
            anyhow::bail!("Nothing to submit: the resume text is empty");
        }
        return Ok(Event::TextSubmitted(text));
    }
    match cli.input {
        Some(ref input) => Ok(Event::FileSelected(input.clone())),
        None => anyhow::bail!("Give a resume file or URL, --text FILE, or --sample"),
    }
}

async fn read_text_arg(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read resume text from stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read resume text from {source}"))
}

async fn job_description(cli: &Cli) -> Result<Option<String>> {
    if let Some(ref path) = cli.job_description_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description from {:?}", path))?;
        return Ok(Some(text));
    }
    Ok(cli.job_description.clone())
}

fn parse_edits(raw: &[String]) -> Result<Vec<EditCommand>> {
    raw.iter()
        .map(|edit| edit.parse::<EditCommand>().context("Invalid --edit"))
        .collect()
}

/// Map CLI args to `RevampConfig`.
async fn build_config(cli: &Cli) -> Result<RevampConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = RevampConfig::builder()
        .dpi(cli.dpi)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .export_scale(cli.export_scale)
        .download_timeout_secs(cli.download_timeout);
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref font) = cli.export_font {
        builder = builder.export_font(font.clone());
    }

    let mut config = builder.build().context("Invalid configuration")?;

    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();
    config.system_prompt = system_prompt;

    Ok(config)
}

/// `--json` and `--html`, written from the settled state.
fn write_outputs(cli: &Cli, state: &SessionState) -> Result<()> {
    if cli.json {
        let record = state.record().context("No resume is loaded")?;
        println!(
            "{}",
            serde_json::to_string_pretty(record).context("Failed to serialise record")?
        );
    }
    if let Some(ref path) = cli.html {
        let doc = state.rendered().context("No resume is loaded")?;
        write_file(path, to_html(&doc).as_bytes())?;
        if !cli.quiet {
            eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
        }
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

// ── PDFium engine ────────────────────────────────────────────────────────────
// On the first run that needs pdfium, the library (~30 MB) is downloaded from
// bblanchon/pdfium-binaries and cached; later runs only check the path.

fn ensure_pdfium(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }
    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    // block_in_place lets the callback borrow `bar` without a 'static bound.
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}
