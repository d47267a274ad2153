//! Observer trait for session events.
//!
//! Inject an [`Arc<dyn SessionObserver>`] via
//! [`crate::runtime::SessionRuntime::observer`] to hear about phase changes,
//! record updates, rejected events and export progress as the runtime
//! processes them.
//!
//! The session state feed ([`crate::runtime::SessionHandle::subscribe`]) is
//! the alternative for consumers that prefer to diff whole states.
//!
//! # Example
//!
//! ```rust
//! use resume_revamp::{Phase, SessionObserver};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Transitions(AtomicUsize);
//!
//! impl SessionObserver for Transitions {
//!     fn on_phase_change(&self, from: &Phase, to: &Phase) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} → {}", from.name(), to.name());
//!     }
//! }
//!
//! let observer: Arc<dyn SessionObserver> = Arc::new(Transitions(AtomicUsize::new(0)));
//! ```

use crate::export::ExportKind;
use crate::record::ResumeRecord;
use crate::session::{Phase, Rejection};
use std::sync::Arc;

/// Called by the session runtime. All methods default to no-ops.
///
/// Export callbacks run on the export's own task and may interleave with
/// each other and with the event-loop callbacks.
pub trait SessionObserver: Send + Sync {
    /// The ingestion phase changed.
    fn on_phase_change(&self, from: &Phase, to: &Phase) {
        let _ = (from, to);
    }

    /// A new record is on screen (ingested, loaded, or edited).
    fn on_record_change(&self, record: &ResumeRecord) {
        let _ = record;
    }

    /// An event was refused; the state did not change.
    fn on_rejected(&self, rejection: &Rejection) {
        let _ = rejection;
    }

    fn on_export_start(&self, kind: ExportKind) {
        let _ = kind;
    }

    /// # Arguments
    /// * `bytes`: size of the finished file
    fn on_export_complete(&self, kind: ExportKind, bytes: usize) {
        let _ = (kind, bytes);
    }

    fn on_export_error(&self, kind: ExportKind, error: &str) {
        let _ = (kind, error);
    }
}

/// The default when no observer is configured.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// The type stored by [`crate::runtime::SessionRuntime`].
pub type Observer = Arc<dyn SessionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        phases: Mutex<Vec<&'static str>>,
        exports: AtomicUsize,
        errors: AtomicUsize,
    }

    impl SessionObserver for Recording {
        fn on_phase_change(&self, _from: &Phase, to: &Phase) {
            self.phases.lock().unwrap().push(to.name());
        }

        fn on_export_complete(&self, _kind: ExportKind, _bytes: usize) {
            self.exports.fetch_add(1, Ordering::SeqCst);
        }

        fn on_export_error(&self, _kind: ExportKind, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_phase_change(&Phase::Idle, &Phase::Editable);
        obs.on_record_change(&crate::record::sample());
        obs.on_rejected(&Rejection::NoRecord);
        obs.on_export_start(ExportKind::Pdf);
        obs.on_export_complete(ExportKind::Pdf, 10);
        obs.on_export_error(ExportKind::Docx, "boom");
    }

    #[test]
    fn overridden_methods_receive_events() {
        let obs = Recording::default();
        obs.on_phase_change(&Phase::Idle, &Phase::Reading { ticket: 1 });
        obs.on_phase_change(&Phase::Reading { ticket: 1 }, &Phase::Extracting { ticket: 1 });
        obs.on_export_complete(ExportKind::Docx, 1024);
        obs.on_export_error(ExportKind::Pdf, "pdfium");

        assert_eq!(*obs.phases.lock().unwrap(), ["reading", "extracting"]);
        assert_eq!(obs.exports.load(Ordering::SeqCst), 1);
        assert_eq!(obs.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let obs: Observer = Arc::new(NoopObserver);
        obs.on_export_start(ExportKind::Pdf);
    }
}
