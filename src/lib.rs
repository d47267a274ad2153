//! # resume-revamp
//!
//! Turn an existing resume into a structured, editable record with an LLM,
//! lay it out through a set of visual templates, and export it as a PDF or
//! a DOCX.
//!
//! ## Why this crate?
//!
//! Resumes arrive as PDFs, phone photos and pasted text. Rather than parsing
//! each format locally, this crate sends the document (rasterised page
//! images, or the raw text) to a model that returns one structured
//! [`ResumeRecord`], optionally rewritten for a target job description. From
//! there everything is local and deterministic: edits are pure record
//! updates, templates are pure functions of the record, and exports read the
//! record without changing it.
//!
//! ## Session Overview
//!
//! ```text
//! upload / paste / sample
//!  │
//!  ├─ 1. Read     local file or URL → bytes + MIME type
//!  ├─ 2. Extract  one chat call (vision for PDFs and images) → ResumeRecord
//!  ├─ 3. Edit     field-level commands, each producing a new record
//!  ├─ 4. Render   record × template → block tree → HTML preview
//!  └─ 5. Export   page-image PDF (pdfium) or editable DOCX (OOXML)
//! ```
//!
//! All state lives in one [`SessionState`] value driven by [`reduce`]; the
//! [`SessionRuntime`] wraps that in an event queue and runs the slow steps on
//! background tasks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_revamp::{Event, ExportKind, ExportOutcome, RevampConfig, SessionRuntime, Template};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / ...
//!     let config = RevampConfig::default();
//!     let session = SessionRuntime::from_config(&config).spawn();
//!
//!     session.dispatch(Event::JobDescriptionChanged("Staff SRE".into()))?;
//!     session.dispatch(Event::FileSelected("resume.pdf".into()))?;
//!     let state = session
//!         .wait_for(|s| s.record.is_some() || s.phase.name() == "error")
//!         .await?;
//!     if state.record.is_none() {
//!         return Err(state.phase.status_message().unwrap_or_default().into());
//!     }
//!
//!     session.dispatch(Event::TemplateSelected(Template::AtsOptimized))?;
//!     session.dispatch(Event::ExportRequested(ExportKind::Docx))?;
//!     if let Some(ExportOutcome::Finished(artifact)) = session.next_export().await {
//!         std::fs::write(&artifact.filename, &artifact.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `revamp` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! resume-revamp = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pdfium;
pub mod progress;
pub mod prompts;
pub mod record;
pub mod runtime;
pub mod session;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RevampConfig, RevampConfigBuilder, DEFAULT_MODEL};
pub use editor::{apply, EditCommand};
pub use error::{EditError, ExportError, ExtractionError, InputError, RevampError};
pub use export::{DocumentExporter, ExportArtifact, ExportBackend, ExportKind, ExportRequest};
pub use ingest::llm::LlmExtractor;
pub use ingest::{ExtractionInput, ResumeExtractor, SourceDocument};
pub use progress::{NoopObserver, SessionObserver};
pub use record::{Contact, Education, Experience, Project, ResumeRecord};
pub use runtime::{ExportOutcome, SessionClosed, SessionHandle, SessionRuntime};
pub use session::{reduce, Command, Event, Phase, Rejection, SessionState, Transition};
pub use template::{render, RenderMode, RenderedDocument, Template};
