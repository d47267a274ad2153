//! Session runtime: an event queue in front of [`session::reduce`].
//!
//! One task owns the state. It pulls [`Event`]s off an unbounded queue,
//! reduces them one at a time, publishes each new state on a `watch` channel
//! and spawns a task for any [`Command`] the transition asked for. Command
//! tasks report back by pushing events onto the same queue, so every state
//! change still happens on the loop task, in order.
//!
//! ```text
//!   dispatch ──▶ mpsc ──▶ loop: reduce ──▶ watch (state feed)
//!                 ▲           │
//!                 │           └──▶ spawn: read / extract / export
//!                 └────────────────────────┘ (outcome events)
//! ```
//!
//! Reading, extraction and exports run off the loop task, so the loop keeps
//! taking edits while a slow export renders. Nothing is cancelled: a started
//! command always reports success or failure, even when the collaborator
//! panics. Each call runs in its own task and a panic comes back as the
//! matching failure event.
//!
//! Export results reach [`SessionHandle::next_export`] only after the loop has
//! applied the completion event, so a client holding an outcome always sees
//! that format's guard released.
//!
//! [`session::reduce`]: crate::session::reduce

use crate::config::RevampConfig;
use crate::error::{ExportError, ExtractionError};
use crate::export::{DocumentExporter, ExportArtifact, ExportBackend, ExportKind, ExportRequest};
use crate::ingest::input::read_source;
use crate::ingest::llm::LlmExtractor;
use crate::ingest::ResumeExtractor;
use crate::progress::{NoopObserver, Observer};
use crate::session::{reduce, Command, Event, SessionState, Transition};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// The session loop has stopped; no further events are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("The session has stopped")]
pub struct SessionClosed;

/// How one export ended, as delivered by [`SessionHandle::next_export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Finished(ExportArtifact),
    Failed { kind: ExportKind, reason: String },
}

impl ExportOutcome {
    pub fn kind(&self) -> ExportKind {
        match self {
            ExportOutcome::Finished(artifact) => artifact.kind,
            ExportOutcome::Failed { kind, .. } => *kind,
        }
    }
}

/// Builder for a running session.
///
/// ```rust,no_run
/// use resume_revamp::{Event, RevampConfig, SessionRuntime};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let session = SessionRuntime::from_config(&RevampConfig::default()).spawn();
/// session.dispatch(Event::SampleRequested)?;
/// let state = session.wait_for(|s| s.record.is_some()).await?;
/// println!("{}", state.record().map(|r| r.full_name.as_str()).unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub struct SessionRuntime {
    extractor: Arc<dyn ResumeExtractor>,
    exporter: Arc<dyn ExportBackend>,
    observer: Observer,
    download_timeout_secs: u64,
    initial: SessionState,
}

impl SessionRuntime {
    pub fn new(extractor: Arc<dyn ResumeExtractor>, exporter: Arc<dyn ExportBackend>) -> Self {
        Self {
            extractor,
            exporter,
            observer: Arc::new(NoopObserver),
            download_timeout_secs: RevampConfig::default().download_timeout_secs,
            initial: SessionState::new(),
        }
    }

    /// The production wiring: LLM extraction and the built-in exporters.
    pub fn from_config(config: &RevampConfig) -> Self {
        Self::new(
            Arc::new(LlmExtractor::new(config.clone())),
            Arc::new(DocumentExporter::new(config)),
        )
        .download_timeout_secs(config.download_timeout_secs)
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.download_timeout_secs = secs;
        self
    }

    /// Start from a state other than the empty upload screen.
    pub fn initial_state(mut self, state: SessionState) -> Self {
        self.initial = state;
        self
    }

    /// Start the loop on the current tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(self.initial.clone());
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            extractor: self.extractor,
            exporter: self.exporter,
            observer: self.observer,
            download_timeout_secs: self.download_timeout_secs,
            events: events_tx.downgrade(),
        };
        tokio::spawn(run_loop(worker, events_rx, state_tx, outcomes_tx));

        SessionHandle {
            events: events_tx,
            state: state_rx,
            outcomes: Mutex::new(outcomes_rx),
        }
    }
}

/// Client side of a running session. Dropping it stops the loop once
/// in-flight commands have reported back.
pub struct SessionHandle {
    events: mpsc::UnboundedSender<Event>,
    state: watch::Receiver<SessionState>,
    outcomes: Mutex<mpsc::UnboundedReceiver<ExportOutcome>>,
}

impl SessionHandle {
    /// Queue an event. Returns immediately.
    pub fn dispatch(&self, event: Event) -> Result<(), SessionClosed> {
        self.events.send(event).map_err(|_| SessionClosed)
    }

    /// Snapshot of the latest state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver that sees every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait until the state satisfies `predicate`, checking the current
    /// state first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState, SessionClosed> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(predicate).await.map_err(|_| SessionClosed)?;
        Ok(state.clone())
    }

    /// Next finished or failed export, in completion order. Each accepted
    /// [`Event::ExportRequested`] yields exactly one outcome.
    pub async fn next_export(&self) -> Option<ExportOutcome> {
        self.outcomes.lock().await.recv().await
    }
}

struct Worker {
    extractor: Arc<dyn ResumeExtractor>,
    exporter: Arc<dyn ExportBackend>,
    observer: Observer,
    download_timeout_secs: u64,
    events: mpsc::WeakUnboundedSender<Event>,
}

async fn run_loop(
    worker: Worker,
    mut events: mpsc::UnboundedReceiver<Event>,
    state_tx: watch::Sender<SessionState>,
    outcomes: mpsc::UnboundedSender<ExportOutcome>,
) {
    let worker = Arc::new(worker);
    while let Some(event) = events.recv().await {
        let delivery = export_outcome(&event);
        let before = state_tx.borrow().clone();
        let Transition {
            state,
            command,
            rejection,
        } = reduce(&before, event);

        if let Some(rejection) = rejection {
            warn!("Rejected event: {}", rejection);
            worker.observer.on_rejected(&rejection);
            deliver(&outcomes, delivery);
            continue;
        }

        if state.phase != before.phase {
            info!("Session: {} → {}", before.phase.name(), state.phase.name());
            worker.observer.on_phase_change(&before.phase, &state.phase);
        }
        if let Some(record) = state.record.as_ref() {
            let changed = before
                .record
                .as_ref()
                .is_none_or(|old| !Arc::ptr_eq(old, record));
            if changed {
                worker.observer.on_record_change(record);
            }
        }

        state_tx.send_replace(state);
        deliver(&outcomes, delivery);

        if let Some(command) = command {
            let Some(reply) = worker.events.upgrade() else {
                break;
            };
            tokio::spawn(Arc::clone(&worker).execute(command, reply));
        }
    }
    debug!("Session loop stopped");
}

/// The client-facing copy of an export completion event.
fn export_outcome(event: &Event) -> Option<ExportOutcome> {
    match event {
        Event::ExportSucceeded(artifact) => Some(ExportOutcome::Finished(artifact.clone())),
        Event::ExportFailed { kind, reason } => Some(ExportOutcome::Failed {
            kind: *kind,
            reason: reason.clone(),
        }),
        _ => None,
    }
}

fn deliver(outcomes: &mpsc::UnboundedSender<ExportOutcome>, outcome: Option<ExportOutcome>) {
    if let Some(outcome) = outcome {
        // Nobody waiting on next_export is fine.
        let _ = outcomes.send(outcome);
    }
}

/// Run `task` on its own tokio task so a panic surfaces as a [`JoinError`]
/// instead of unwinding through the worker.
async fn isolated<F>(task: F) -> Result<F::Output, JoinError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(task).await
}

impl Worker {
    async fn execute(self: Arc<Self>, command: Command, reply: mpsc::UnboundedSender<Event>) {
        let outcome = match command {
            Command::ReadSource { ticket, source } => {
                let timeout = self.download_timeout_secs;
                let path = source.clone();
                match isolated(async move { read_source(&path, timeout).await }).await {
                    Ok(Ok(document)) => Event::FileRead { ticket, document },
                    Ok(Err(e)) => {
                        warn!("Reading '{}' failed: {}", source, e);
                        Event::FileReadFailed {
                            ticket,
                            reason: e.to_string(),
                        }
                    }
                    Err(e) => {
                        warn!("Reading '{}' panicked: {}", source, e);
                        Event::FileReadFailed {
                            ticket,
                            reason: format!("Read task panicked: {}", e),
                        }
                    }
                }
            }
            Command::Extract {
                ticket,
                input,
                job_description,
            } => {
                let extractor = Arc::clone(&self.extractor);
                let result = isolated(async move {
                    extractor.extract(input, job_description.as_deref()).await
                })
                .await
                .unwrap_or_else(|e| {
                    Err(ExtractionError::Internal(format!(
                        "Extraction task panicked: {}",
                        e
                    )))
                });
                match result {
                    Ok(record) => Event::ExtractionSucceeded { ticket, record },
                    Err(e) => {
                        warn!("Extraction failed: {}", e);
                        Event::ExtractionFailed {
                            ticket,
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Command::Export(request) => self.export(request).await,
        };
        // A closed queue means the handle is gone; nobody is listening.
        let _ = reply.send(outcome);
    }

    async fn export(&self, request: ExportRequest) -> Event {
        let kind = request.kind;
        let filename = request.filename();
        self.observer.on_export_start(kind);

        let exporter = Arc::clone(&self.exporter);
        let result = isolated(async move { exporter.export(&request).await })
            .await
            .unwrap_or_else(|e| {
                Err(ExportError::Internal(format!(
                    "Export task panicked: {}",
                    e
                )))
            });

        match result {
            Ok(bytes) => {
                self.observer.on_export_complete(kind, bytes.len());
                Event::ExportSucceeded(ExportArtifact {
                    kind,
                    filename,
                    bytes,
                })
            }
            Err(e) => {
                warn!("{} export failed: {}", kind, e);
                let reason = e.to_string();
                self.observer.on_export_error(kind, &reason);
                Event::ExportFailed { kind, reason }
            }
        }
    }
}
