//! End-to-end session tests with stub collaborators.
//!
//! The extractor and exporter are replaced by in-process doubles, so these
//! run without an API key or the pdfium library. The DOCX test uses the real
//! exporter because DOCX packaging needs neither.

use async_trait::async_trait;
use resume_revamp::editor::{EditCommand, ExperienceField};
use resume_revamp::error::{
    ExportError, ExtractionError, EXTRACTION_FAILED_MESSAGE, READ_FAILED_MESSAGE,
};
use resume_revamp::ingest::decode::decode_record;
use resume_revamp::record::sample;
use resume_revamp::{
    DocumentExporter, Event, ExportBackend, ExportKind, ExportOutcome, ExportRequest,
    ExtractionInput, Phase, ResumeExtractor, ResumeRecord, SessionHandle, SessionRuntime,
    SessionState,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const REPLY: &str = r#"{"fullName":"Jo Doe","jobTitle":"Platform Engineer",
    "contact":{"email":"jo@example.com","location":"Berlin"},
    "summary":"Keeps things running.","skills":["Rust","Kubernetes"],
    "experience":[{"role":"SRE","company":"Acme","dates":"2020 - Present",
        "description":["Cut paging by half"]}],
    "education":[]}"#;

/// Replies with a fixed model response, decoded the same way the real
/// extractor decodes.
struct StubExtractor {
    reply: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<(ExtractionInput, Option<String>)>>,
}

impl StubExtractor {
    fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ResumeExtractor for StubExtractor {
    async fn extract(
        &self,
        input: ExtractionInput,
        job_description: Option<&str>,
    ) -> Result<ResumeRecord, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((input, job_description.map(str::to_string)));
        decode_record(&self.reply)
    }
}

/// Returns fixed bytes, or fails, and counts calls.
struct StubExporter {
    fail: bool,
    calls: AtomicUsize,
}

impl StubExporter {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ExportBackend for StubExporter {
    async fn export(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ExportError::Rasterisation("canvas too large".into()));
        }
        Ok(format!("{}:{}", request.kind, request.record.full_name).into_bytes())
    }
}

fn session(extractor: Arc<StubExtractor>, exporter: Arc<dyn ExportBackend>) -> SessionHandle {
    SessionRuntime::new(extractor, exporter).spawn()
}

async fn settled(session: &SessionHandle) -> SessionState {
    session
        .wait_for(|s| s.record.is_some() || matches!(s.phase, Phase::Error { .. }))
        .await
        .unwrap()
}

async fn with_sample(exporter: Arc<dyn ExportBackend>) -> (SessionHandle, SessionState) {
    let session = session(StubExtractor::replying(REPLY), exporter);
    session.dispatch(Event::SampleRequested).unwrap();
    let state = settled(&session).await;
    (session, state)
}

// ── Ingestion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sample_loads_without_calling_the_extractor() {
    let extractor = StubExtractor::replying(REPLY);
    let session = session(Arc::clone(&extractor), StubExporter::ok());

    session.dispatch(Event::SampleRequested).unwrap();
    let state = settled(&session).await;

    assert_eq!(state.phase, Phase::Editable);
    assert_eq!(state.record().unwrap(), &sample());
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pasted_text_is_extracted_with_the_job_description() {
    let extractor = StubExtractor::replying(REPLY);
    let session = session(Arc::clone(&extractor), StubExporter::ok());

    session
        .dispatch(Event::JobDescriptionChanged("Staff SRE, on-call heavy".into()))
        .unwrap();
    session
        .dispatch(Event::TextSubmitted("Jo Doe, SRE at Acme".into()))
        .unwrap();
    let state = settled(&session).await;

    assert_eq!(state.phase, Phase::Editable);
    assert_eq!(state.record().unwrap().full_name, "Jo Doe");

    let seen = extractor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, ExtractionInput::Text("Jo Doe, SRE at Acme".into()));
    assert_eq!(seen[0].1.as_deref(), Some("Staff SRE, on-call heavy"));
}

#[tokio::test]
async fn fenced_and_bare_replies_give_the_same_record() {
    let bare = session(StubExtractor::replying(REPLY), StubExporter::ok());
    let fenced = session(
        StubExtractor::replying(format!("```json\n{REPLY}\n```")),
        StubExporter::ok(),
    );
    for s in [&bare, &fenced] {
        s.dispatch(Event::TextSubmitted("resume".into())).unwrap();
    }

    let a = settled(&bare).await;
    let b = settled(&fenced).await;
    assert!(a.record.is_some());
    assert_eq!(a.record(), b.record());
}

#[tokio::test]
async fn selected_file_is_read_then_extracted() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(file, "Jo Doe\nSRE at Acme").unwrap();

    let extractor = StubExtractor::replying(REPLY);
    let session = session(Arc::clone(&extractor), StubExporter::ok());
    session
        .dispatch(Event::FileSelected(file.path().display().to_string()))
        .unwrap();
    let state = settled(&session).await;

    assert_eq!(state.phase, Phase::Editable);
    let seen = extractor.seen.lock().unwrap();
    match &seen[0].0 {
        ExtractionInput::Document(doc) => {
            assert_eq!(doc.mime_type, "text/plain");
            assert_eq!(doc.bytes, b"Jo Doe\nSRE at Acme");
        }
        other => panic!("expected a document, got {other:?}"),
    }
    assert_eq!(seen[0].1, None);
}

#[tokio::test]
async fn unreadable_file_returns_to_upload_with_message() {
    let extractor = StubExtractor::replying(REPLY);
    let session = session(Arc::clone(&extractor), StubExporter::ok());

    session
        .dispatch(Event::FileSelected("/no/such/resume.pdf".into()))
        .unwrap();
    let state = settled(&session).await;

    assert_eq!(
        state.phase,
        Phase::Error {
            message: READ_FAILED_MESSAGE.into()
        }
    );
    assert!(state.record.is_none());
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unusable_reply_shows_generic_failure_and_no_record() {
    let session = session(
        StubExtractor::replying("I'm sorry, I can't read that file."),
        StubExporter::ok(),
    );
    session.dispatch(Event::TextSubmitted("x".into())).unwrap();
    let state = settled(&session).await;

    assert_eq!(state.phase.status_message(), Some(EXTRACTION_FAILED_MESSAGE));
    assert!(state.record.is_none());
}

#[tokio::test]
async fn failed_extraction_can_be_retried() {
    let session = session(StubExtractor::replying(""), StubExporter::ok());
    session.dispatch(Event::TextSubmitted("x".into())).unwrap();
    let first = settled(&session).await;
    assert!(matches!(first.phase, Phase::Error { .. }));

    session.dispatch(Event::TextSubmitted("x again".into())).unwrap();
    let retried = session
        .wait_for(|s| matches!(s.phase, Phase::Extracting { .. } | Phase::Error { .. }) && *s != first)
        .await
        .unwrap();
    assert!(retried.record.is_none());
}

#[tokio::test]
async fn start_over_discards_the_record() {
    let (session, _) = with_sample(StubExporter::ok()).await;
    session.dispatch(Event::StartOver).unwrap();
    let state = session.wait_for(|s| s.phase == Phase::Idle).await.unwrap();
    assert!(state.record.is_none());
}

// ── Editing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn description_blob_keeps_trailing_empty_bullet() {
    let (session, _) = with_sample(StubExporter::ok()).await;
    session
        .dispatch(Event::Edit(EditCommand::SetExperience {
            index: 0,
            field: ExperienceField::Description,
            value: "Led X\nShipped Y\n".into(),
        }))
        .unwrap();

    let state = session
        .wait_for(|s| s.record().is_some_and(|r| r.experience[0].description.len() == 3))
        .await
        .unwrap();
    assert_eq!(
        state.record().unwrap().experience[0].description,
        ["Led X", "Shipped Y", ""]
    );
}

#[tokio::test]
async fn add_then_remove_last_skill_restores_the_record() {
    let (session, before) = with_sample(StubExporter::ok()).await;
    let original = before.record().unwrap().clone();
    let n = original.skills.len();

    session.dispatch(Event::Edit(EditCommand::AddSkill)).unwrap();
    let added = session
        .wait_for(|s| s.record().is_some_and(|r| r.skills.len() == n + 1))
        .await
        .unwrap();
    assert_eq!(added.record().unwrap().skills[n], "New Skill");

    session
        .dispatch(Event::Edit(EditCommand::RemoveSkill { index: n }))
        .unwrap();
    let restored = session
        .wait_for(|s| s.record().is_some_and(|r| r.skills.len() == n))
        .await
        .unwrap();
    assert_eq!(restored.record().unwrap(), &original);
}

#[tokio::test]
async fn removing_an_experience_shifts_the_rest_up() {
    let (session, before) = with_sample(StubExporter::ok()).await;
    let second = before.record().unwrap().experience[1].clone();

    session
        .dispatch(Event::Edit(EditCommand::RemoveExperience { index: 0 }))
        .unwrap();
    let state = session
        .wait_for(|s| s.record().is_some_and(|r| r.experience.len() == 1))
        .await
        .unwrap();
    assert_eq!(state.record().unwrap().experience[0], second);
}

// ── Export ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_is_named_after_the_full_name() {
    let exporter = StubExporter::ok();
    let (session, _) = with_sample(exporter.clone()).await;

    session
        .dispatch(Event::ExportRequested(ExportKind::Pdf))
        .unwrap();
    match session.next_export().await {
        Some(ExportOutcome::Finished(artifact)) => {
            assert_eq!(artifact.filename, "Alex_Morgan_Resume.pdf");
            assert_eq!(artifact.bytes, b"PDF:Alex Morgan");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    let state = session.wait_for(|s| !s.exports.any()).await.unwrap();
    assert!(state.alert.is_none());
    assert_eq!(exporter.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_export_alerts_and_leaves_the_record_alone() {
    let (session, before) = with_sample(StubExporter::failing()).await;

    session
        .dispatch(Event::ExportRequested(ExportKind::Pdf))
        .unwrap();
    let outcome = session.next_export().await.unwrap();
    assert!(matches!(
        outcome,
        ExportOutcome::Failed {
            kind: ExportKind::Pdf,
            ..
        }
    ));

    let state = session
        .wait_for(|s| !s.exports.pdf && s.alert.is_some())
        .await
        .unwrap();
    assert_eq!(
        state.alert.as_deref(),
        Some("Failed to generate PDF. Please try again.")
    );
    assert_eq!(state.record(), before.record());

    // The control is usable again.
    session
        .dispatch(Event::ExportRequested(ExportKind::Pdf))
        .unwrap();
    assert!(session.next_export().await.is_some());
}

#[tokio::test]
async fn docx_export_through_the_real_adapter() {
    let (session, _) = with_sample(Arc::new(DocumentExporter::default())).await;

    session
        .dispatch(Event::ExportRequested(ExportKind::Docx))
        .unwrap();
    match session.next_export().await {
        Some(ExportOutcome::Finished(artifact)) => {
            assert_eq!(artifact.filename, "Alex_Morgan_Resume.docx");
            assert_eq!(&artifact.bytes[..2], b"PK");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn guard_is_released_by_the_time_the_outcome_arrives() {
    let exporter = StubExporter::ok();
    let (session, _) = with_sample(exporter.clone()).await;

    for _ in 0..200 {
        session
            .dispatch(Event::ExportRequested(ExportKind::Pdf))
            .unwrap();
        let outcome = session.next_export().await.unwrap();
        assert_eq!(outcome.kind(), ExportKind::Pdf);
        assert!(!session.state().exports.pdf);
    }
    assert_eq!(exporter.calls.load(Ordering::SeqCst), 200);
}

/// Panics inside the collaborator call.
struct Panicking;

#[async_trait]
impl ExportBackend for Panicking {
    async fn export(&self, _request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
        panic!("renderer blew up")
    }
}

#[async_trait]
impl ResumeExtractor for Panicking {
    async fn extract(
        &self,
        _input: ExtractionInput,
        _job_description: Option<&str>,
    ) -> Result<ResumeRecord, ExtractionError> {
        panic!("provider blew up")
    }
}

#[tokio::test]
async fn panicking_exporter_reports_failure_and_frees_the_session() {
    let (session, before) = with_sample(Arc::new(Panicking)).await;

    session
        .dispatch(Event::ExportRequested(ExportKind::Pdf))
        .unwrap();
    match session.next_export().await {
        Some(ExportOutcome::Failed { kind, reason }) => {
            assert_eq!(kind, ExportKind::Pdf);
            assert!(reason.contains("panicked"), "{reason}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let state = session.state();
    assert!(!state.exports.any());
    assert_eq!(
        state.alert.as_deref(),
        Some("Failed to generate PDF. Please try again.")
    );
    assert_eq!(state.record(), before.record());

    session.dispatch(Event::StartOver).unwrap();
    let state = session
        .wait_for(|s| s.phase == Phase::Idle)
        .await
        .unwrap();
    assert!(state.record.is_none());
}

#[tokio::test]
async fn panicking_extractor_lands_on_the_error_screen() {
    let session = SessionRuntime::new(Arc::new(Panicking), StubExporter::ok()).spawn();

    session
        .dispatch(Event::TextSubmitted("Jo Doe, SRE".into()))
        .unwrap();
    let state = settled(&session).await;

    assert_eq!(
        state.phase,
        Phase::Error {
            message: EXTRACTION_FAILED_MESSAGE.into()
        }
    );
    assert!(state.record.is_none());
}
