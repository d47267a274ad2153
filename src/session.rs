//! Session state machine.
//!
//! The whole application state is one immutable [`SessionState`] value.
//! [`reduce`] takes the current state and an [`Event`] and returns the next
//! state, at most one [`Command`] for the runtime to execute, and a
//! [`Rejection`] when the event was not allowed. `reduce` does no I/O; the
//! runtime ([`crate::runtime`]) runs commands and feeds their outcomes back
//! in as events.
//!
//! ## Ingestion phases
//!
//! ```text
//!          file selected            bytes read
//!  idle ───────────────▶ reading ─────────────▶ extracting ──▶ editable
//!   │ ▲                     │                       ▲   │          │
//!   │ │ start over          └── read failed ──┐     │   └─ failed ─┤
//!   │ └───────────────────────────────────────┼─────┼──────────────┘
//!   ├── text submitted ───────────────────────┼─────┘              │
//!   └── sample ───────────────────────────────┼────────────────────┘
//!                                             ▼
//!                                           error  (upload screen + message)
//! ```
//!
//! `error` accepts the same events as `idle`. Each ingestion gets a fresh
//! ticket; a completion carrying any other ticket is ignored.
//!
//! ## Export guard
//!
//! One in-flight flag per export kind. While any export runs, the record,
//! template and render mode are frozen so the export reflects what is on
//! screen. A failed export raises an alert and leaves the record as it was.

use crate::editor::{self, EditCommand};
use crate::error::{EditError, EXTRACTION_FAILED_MESSAGE, READ_FAILED_MESSAGE};
use crate::export::{ExportArtifact, ExportKind, ExportRequest};
use crate::ingest::{ExtractionInput, SourceDocument};
use crate::record::{self, ResumeRecord};
use crate::template::{self, RenderMode, RenderedDocument, Template};
use std::sync::Arc;
use thiserror::Error;

/// Identifies one ingestion attempt.
pub type Ticket = u64;

/// Progress text while a file is read.
pub const READING_MESSAGE: &str = "Reading file...";
/// Progress text while the model works. There is no real progress signal.
pub const EXTRACTING_MESSAGE: &str = "AI is analyzing and upgrading your resume...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Reading {
        ticket: Ticket,
    },
    Extracting {
        ticket: Ticket,
    },
    Editable,
    /// Back on the upload screen with a message.
    Error {
        message: String,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Reading { .. } => "reading",
            Phase::Extracting { .. } => "extracting",
            Phase::Editable => "editable",
            Phase::Error { .. } => "error",
        }
    }

    /// Ticket of the ingestion in flight, if any.
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Phase::Reading { ticket } | Phase::Extracting { ticket } => Some(*ticket),
            _ => None,
        }
    }

    pub fn is_ingesting(&self) -> bool {
        self.ticket().is_some()
    }

    /// The upload screen: `idle` or `error`.
    pub fn accepts_ingestion(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Error { .. })
    }

    /// Line to show under the spinner or on the upload screen.
    pub fn status_message(&self) -> Option<&str> {
        match self {
            Phase::Reading { .. } => Some(READING_MESSAGE),
            Phase::Extracting { .. } => Some(EXTRACTING_MESSAGE),
            Phase::Error { message } => Some(message),
            Phase::Idle | Phase::Editable => None,
        }
    }
}

/// Which exports are in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportGuard {
    pub pdf: bool,
    pub docx: bool,
}

impl ExportGuard {
    pub fn is_busy(&self, kind: ExportKind) -> bool {
        match kind {
            ExportKind::Pdf => self.pdf,
            ExportKind::Docx => self.docx,
        }
    }

    pub fn any(&self) -> bool {
        self.pdf || self.docx
    }

    fn with(mut self, kind: ExportKind, busy: bool) -> Self {
        match kind {
            ExportKind::Pdf => self.pdf = busy,
            ExportKind::Docx => self.docx = busy,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// Present exactly when `phase` is `Editable`.
    pub record: Option<Arc<ResumeRecord>>,
    pub template: Template,
    pub render_mode: RenderMode,
    /// As typed. Blank means "no target job".
    pub job_description: String,
    /// Blocking alert, e.g. a failed export.
    pub alert: Option<String>,
    pub exports: ExportGuard,
    last_ticket: Ticket,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> Option<&ResumeRecord> {
        self.record.as_deref()
    }

    /// The job description to send with an extraction, if any.
    pub fn target_job(&self) -> Option<&str> {
        let jd = self.job_description.trim();
        (!jd.is_empty()).then_some(self.job_description.as_str())
    }

    /// The current record under the current template and mode.
    pub fn rendered(&self) -> Option<RenderedDocument> {
        self.record()
            .map(|r| template::render(r, &self.template, self.render_mode))
    }

    fn next_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        self.last_ticket
    }
}

/// Inputs to [`reduce`]: user actions and command outcomes.
#[derive(Debug, Clone)]
pub enum Event {
    JobDescriptionChanged(String),
    /// A path or URL to read.
    FileSelected(String),
    FileRead {
        ticket: Ticket,
        document: SourceDocument,
    },
    FileReadFailed {
        ticket: Ticket,
        reason: String,
    },
    TextSubmitted(String),
    SampleRequested,
    ExtractionSucceeded {
        ticket: Ticket,
        record: ResumeRecord,
    },
    ExtractionFailed {
        ticket: Ticket,
        reason: String,
    },
    StartOver,
    Edit(EditCommand),
    TemplateSelected(Template),
    RenderModeChanged(RenderMode),
    ExportRequested(ExportKind),
    /// Carries the finished file; the runtime hands it to the client once the
    /// guard is released.
    ExportSucceeded(ExportArtifact),
    ExportFailed {
        kind: ExportKind,
        reason: String,
    },
    AlertDismissed,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone)]
pub enum Command {
    ReadSource {
        ticket: Ticket,
        source: String,
    },
    Extract {
        ticket: Ticket,
        input: ExtractionInput,
        job_description: Option<String>,
    },
    Export(ExportRequest),
}

/// Why an event left the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("An ingestion is already in progress")]
    IngestionInProgress,

    #[error("A resume is already loaded; start over first")]
    RecordLoaded,

    #[error("No resume is loaded")]
    NoRecord,

    #[error("A {0} export is already in progress")]
    ExportInProgress(ExportKind),

    /// Edits, template and mode changes wait for running exports.
    #[error("An export is running; try again when it finishes")]
    ExportRunning,

    #[error("Ignoring a result from an abandoned ingestion (ticket {0})")]
    StaleTicket(Ticket),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Result of [`reduce`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub command: Option<Command>,
    pub rejection: Option<Rejection>,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            command: None,
            rejection: None,
        }
    }

    fn run(state: SessionState, command: Command) -> Self {
        Self {
            state,
            command: Some(command),
            rejection: None,
        }
    }

    fn reject(state: &SessionState, rejection: Rejection) -> Self {
        Self {
            state: state.clone(),
            command: None,
            rejection: Some(rejection),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Apply one event.
pub fn reduce(state: &SessionState, event: Event) -> Transition {
    let mut next = state.clone();
    match event {
        Event::JobDescriptionChanged(text) => {
            next.job_description = text;
            Transition::to(next)
        }

        Event::FileSelected(source) => {
            if let Err(rejection) = check_can_ingest(state) {
                return Transition::reject(state, rejection);
            }
            let ticket = next.next_ticket();
            next.phase = Phase::Reading { ticket };
            Transition::run(next, Command::ReadSource { ticket, source })
        }

        Event::FileRead { ticket, document } => match state.phase {
            Phase::Reading { ticket: current } if current == ticket => {
                next.phase = Phase::Extracting { ticket };
                let job_description = state.target_job().map(str::to_string);
                Transition::run(
                    next,
                    Command::Extract {
                        ticket,
                        input: ExtractionInput::Document(document),
                        job_description,
                    },
                )
            }
            _ => Transition::reject(state, Rejection::StaleTicket(ticket)),
        },

        Event::FileReadFailed { ticket, .. } => match state.phase {
            Phase::Reading { ticket: current } if current == ticket => {
                next.phase = Phase::Error {
                    message: READ_FAILED_MESSAGE.to_string(),
                };
                Transition::to(next)
            }
            _ => Transition::reject(state, Rejection::StaleTicket(ticket)),
        },

        Event::TextSubmitted(text) => {
            if let Err(rejection) = check_can_ingest(state) {
                return Transition::reject(state, rejection);
            }
            let ticket = next.next_ticket();
            next.phase = Phase::Extracting { ticket };
            let job_description = state.target_job().map(str::to_string);
            Transition::run(
                next,
                Command::Extract {
                    ticket,
                    input: ExtractionInput::Text(text),
                    job_description,
                },
            )
        }

        Event::SampleRequested => {
            if let Err(rejection) = check_can_ingest(state) {
                return Transition::reject(state, rejection);
            }
            next.phase = Phase::Editable;
            next.record = Some(Arc::new(record::sample()));
            Transition::to(next)
        }

        Event::ExtractionSucceeded { ticket, record } => match state.phase {
            Phase::Extracting { ticket: current } if current == ticket => {
                next.phase = Phase::Editable;
                next.record = Some(Arc::new(record));
                Transition::to(next)
            }
            _ => Transition::reject(state, Rejection::StaleTicket(ticket)),
        },

        Event::ExtractionFailed { ticket, .. } => match state.phase {
            Phase::Extracting { ticket: current } if current == ticket => {
                next.phase = Phase::Error {
                    message: EXTRACTION_FAILED_MESSAGE.to_string(),
                };
                next.record = None;
                Transition::to(next)
            }
            _ => Transition::reject(state, Rejection::StaleTicket(ticket)),
        },

        Event::StartOver => {
            if state.phase.is_ingesting() {
                return Transition::reject(state, Rejection::IngestionInProgress);
            }
            if state.phase != Phase::Editable {
                return Transition::reject(state, Rejection::NoRecord);
            }
            if state.exports.any() {
                return Transition::reject(state, Rejection::ExportRunning);
            }
            next.phase = Phase::Idle;
            next.record = None;
            next.alert = None;
            Transition::to(next)
        }

        Event::Edit(command) => {
            let Some(current) = state.record.as_deref() else {
                return Transition::reject(state, Rejection::NoRecord);
            };
            if state.exports.any() {
                return Transition::reject(state, Rejection::ExportRunning);
            }
            match editor::apply(current, &command) {
                Ok(updated) => {
                    next.record = Some(Arc::new(updated));
                    Transition::to(next)
                }
                Err(e) => Transition::reject(state, e.into()),
            }
        }

        Event::TemplateSelected(template) => {
            if state.exports.any() {
                return Transition::reject(state, Rejection::ExportRunning);
            }
            next.template = template;
            Transition::to(next)
        }

        Event::RenderModeChanged(mode) => {
            if state.exports.any() {
                return Transition::reject(state, Rejection::ExportRunning);
            }
            next.render_mode = mode;
            Transition::to(next)
        }

        Event::ExportRequested(kind) => {
            let Some(record) = state.record.clone() else {
                return Transition::reject(state, Rejection::NoRecord);
            };
            if state.exports.is_busy(kind) {
                return Transition::reject(state, Rejection::ExportInProgress(kind));
            }
            next.exports = state.exports.with(kind, true);
            let request = ExportRequest {
                kind,
                record,
                template: state.template.clone(),
                mode: state.render_mode,
            };
            Transition::run(next, Command::Export(request))
        }

        Event::ExportSucceeded(artifact) => {
            next.exports = state.exports.with(artifact.kind, false);
            Transition::to(next)
        }

        Event::ExportFailed { kind, .. } => {
            next.exports = state.exports.with(kind, false);
            next.alert = Some(kind.failure_message().to_string());
            Transition::to(next)
        }

        Event::AlertDismissed => {
            next.alert = None;
            Transition::to(next)
        }
    }
}

fn check_can_ingest(state: &SessionState) -> Result<(), Rejection> {
    if state.phase.is_ingesting() {
        Err(Rejection::IngestionInProgress)
    } else if !state.phase.accepts_ingestion() {
        Err(Rejection::RecordLoaded)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ScalarField;

    fn apply_all(events: impl IntoIterator<Item = Event>) -> SessionState {
        events
            .into_iter()
            .fold(SessionState::new(), |state, event| reduce(&state, event).state)
    }

    fn editable() -> SessionState {
        apply_all([Event::SampleRequested])
    }

    #[test]
    fn sample_goes_straight_to_editable() {
        let t = reduce(&SessionState::new(), Event::SampleRequested);
        assert_eq!(t.state.phase, Phase::Editable);
        assert!(t.command.is_none());
        assert_eq!(t.state.record().unwrap().full_name, "Alex Morgan");
    }

    #[test]
    fn file_flow_reads_then_extracts() {
        let t = reduce(&SessionState::new(), Event::FileSelected("cv.pdf".into()));
        let ticket = match (&t.state.phase, &t.command) {
            (Phase::Reading { ticket }, Some(Command::ReadSource { source, .. })) => {
                assert_eq!(source, "cv.pdf");
                *ticket
            }
            other => panic!("unexpected {other:?}"),
        };

        let doc = SourceDocument::new("cv.pdf", "application/pdf", b"%PDF".to_vec());
        let t = reduce(&t.state, Event::FileRead { ticket, document: doc });
        assert_eq!(t.state.phase, Phase::Extracting { ticket });
        assert!(matches!(
            t.command,
            Some(Command::Extract { input: ExtractionInput::Document(_), .. })
        ));

        let t = reduce(
            &t.state,
            Event::ExtractionSucceeded {
                ticket,
                record: record::sample(),
            },
        );
        assert_eq!(t.state.phase, Phase::Editable);
        assert!(t.state.record.is_some());
    }

    #[test]
    fn text_skips_reading_and_carries_job_description() {
        let state = apply_all([Event::JobDescriptionChanged("Staff SRE".into())]);
        let t = reduce(&state, Event::TextSubmitted("Jo Doe".into()));
        assert!(matches!(t.state.phase, Phase::Extracting { .. }));
        match t.command {
            Some(Command::Extract {
                input: ExtractionInput::Text(text),
                job_description,
                ..
            }) => {
                assert_eq!(text, "Jo Doe");
                assert_eq!(job_description.as_deref(), Some("Staff SRE"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn blank_job_description_is_not_sent() {
        let state = apply_all([Event::JobDescriptionChanged("  \n".into())]);
        let t = reduce(&state, Event::TextSubmitted("x".into()));
        assert!(matches!(
            t.command,
            Some(Command::Extract { job_description: None, .. })
        ));
    }

    #[test]
    fn read_failure_lands_on_error() {
        let t = reduce(&SessionState::new(), Event::FileSelected("cv.pdf".into()));
        let ticket = t.state.phase.ticket().unwrap();
        let t = reduce(
            &t.state,
            Event::FileReadFailed {
                ticket,
                reason: "gone".into(),
            },
        );
        assert_eq!(
            t.state.phase,
            Phase::Error {
                message: READ_FAILED_MESSAGE.into()
            }
        );
    }

    #[test]
    fn extraction_failure_keeps_no_record_and_allows_retry() {
        let t = reduce(&SessionState::new(), Event::TextSubmitted("x".into()));
        let ticket = t.state.phase.ticket().unwrap();
        let t = reduce(
            &t.state,
            Event::ExtractionFailed {
                ticket,
                reason: "bad json".into(),
            },
        );
        assert_eq!(t.state.phase.status_message(), Some(EXTRACTION_FAILED_MESSAGE));
        assert!(t.state.record.is_none());

        let retry = reduce(&t.state, Event::TextSubmitted("x".into()));
        assert!(!retry.is_rejected());
        assert_ne!(retry.state.phase.ticket(), Some(ticket));
    }

    #[test]
    fn second_ingestion_is_rejected_while_in_flight() {
        let t = reduce(&SessionState::new(), Event::TextSubmitted("x".into()));
        for event in [
            Event::TextSubmitted("y".into()),
            Event::FileSelected("cv.pdf".into()),
            Event::SampleRequested,
        ] {
            let again = reduce(&t.state, event);
            assert_eq!(again.rejection, Some(Rejection::IngestionInProgress));
            assert_eq!(again.state, t.state);
            assert!(again.command.is_none());
        }
    }

    #[test]
    fn stale_completion_is_ignored() {
        let t = reduce(&SessionState::new(), Event::TextSubmitted("x".into()));
        let ticket = t.state.phase.ticket().unwrap();
        let stale = reduce(
            &t.state,
            Event::ExtractionSucceeded {
                ticket: ticket + 7,
                record: record::sample(),
            },
        );
        assert_eq!(stale.rejection, Some(Rejection::StaleTicket(ticket + 7)));
        assert_eq!(stale.state.phase, Phase::Extracting { ticket });
    }

    #[test]
    fn start_over_only_from_editable() {
        let t = reduce(&SessionState::new(), Event::TextSubmitted("x".into()));
        assert_eq!(
            reduce(&t.state, Event::StartOver).rejection,
            Some(Rejection::IngestionInProgress)
        );
        assert_eq!(
            reduce(&SessionState::new(), Event::StartOver).rejection,
            Some(Rejection::NoRecord)
        );

        let t = reduce(&editable(), Event::StartOver);
        assert_eq!(t.state.phase, Phase::Idle);
        assert!(t.state.record.is_none());
    }

    #[test]
    fn ingestion_needs_start_over_once_editable() {
        let t = reduce(&editable(), Event::TextSubmitted("x".into()));
        assert_eq!(t.rejection, Some(Rejection::RecordLoaded));
    }

    #[test]
    fn edit_replaces_record() {
        let state = editable();
        let t = reduce(
            &state,
            Event::Edit(EditCommand::SetScalar {
                field: ScalarField::FullName,
                value: "Sam Lee".into(),
            }),
        );
        assert_eq!(t.state.record().unwrap().full_name, "Sam Lee");
        assert_eq!(state.record().unwrap().full_name, "Alex Morgan");
    }

    #[test]
    fn bad_edit_is_rejected_without_change() {
        let state = editable();
        let t = reduce(&state, Event::Edit(EditCommand::RemoveSkill { index: 99 }));
        assert!(matches!(
            t.rejection,
            Some(Rejection::Edit(EditError::IndexOutOfRange { .. }))
        ));
        assert_eq!(t.state, state);
    }

    #[test]
    fn export_guard_blocks_duplicates_and_edits() {
        let t = reduce(&editable(), Event::ExportRequested(ExportKind::Pdf));
        assert!(t.state.exports.pdf);
        let requested = match t.command {
            Some(Command::Export(ref request)) => request.clone(),
            ref other => panic!("unexpected {other:?}"),
        };
        assert_eq!(requested.kind, ExportKind::Pdf);

        let dup = reduce(&t.state, Event::ExportRequested(ExportKind::Pdf));
        assert_eq!(dup.rejection, Some(Rejection::ExportInProgress(ExportKind::Pdf)));

        let other_kind = reduce(&t.state, Event::ExportRequested(ExportKind::Docx));
        assert!(!other_kind.is_rejected());

        let edit = reduce(&t.state, Event::Edit(EditCommand::AddSkill));
        assert_eq!(edit.rejection, Some(Rejection::ExportRunning));
        let tpl = reduce(&t.state, Event::TemplateSelected(Template::AtsOptimized));
        assert_eq!(tpl.rejection, Some(Rejection::ExportRunning));
    }

    #[test]
    fn export_failure_raises_alert_and_releases_guard() {
        let state = editable();
        let before = state.record.clone();
        let t = reduce(&state, Event::ExportRequested(ExportKind::Docx));
        let t = reduce(
            &t.state,
            Event::ExportFailed {
                kind: ExportKind::Docx,
                reason: "zip".into(),
            },
        );
        assert!(!t.state.exports.docx);
        assert_eq!(
            t.state.alert.as_deref(),
            Some("Failed to generate DOCX. Please try again.")
        );
        assert_eq!(t.state.record, before);

        let t = reduce(&t.state, Event::AlertDismissed);
        assert!(t.state.alert.is_none());
    }

    #[test]
    fn export_success_releases_guard_without_alert() {
        let t = reduce(&editable(), Event::ExportRequested(ExportKind::Pdf));
        let t = reduce(
            &t.state,
            Event::ExportSucceeded(ExportArtifact {
                kind: ExportKind::Pdf,
                filename: "Alex_Morgan_Resume.pdf".into(),
                bytes: b"%PDF".to_vec(),
            }),
        );
        assert!(!t.is_rejected());
        assert!(!t.state.exports.any());
        assert!(t.state.alert.is_none());

        let again = reduce(&t.state, Event::ExportRequested(ExportKind::Pdf));
        assert!(!again.is_rejected());
    }

    #[test]
    fn export_requires_a_record() {
        let t = reduce(&SessionState::new(), Event::ExportRequested(ExportKind::Pdf));
        assert_eq!(t.rejection, Some(Rejection::NoRecord));
    }

    #[test]
    fn rendered_follows_template() {
        let state = apply_all([
            Event::SampleRequested,
            Event::TemplateSelected(Template::Functional),
        ]);
        let doc = state.rendered().unwrap();
        assert!(doc.texts().iter().any(|t| t == template::NOT_IMPLEMENTED_TITLE));
    }
}
