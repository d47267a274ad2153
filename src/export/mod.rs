//! Export adapters: the current record → a downloadable file.
//!
//! Two formats, two very different strategies:
//!
//! | Kind | Source | Strategy |
//! |------|--------|----------|
//! | PDF  | the rendered template (print mode) | paint, rasterise, slice into A4 page images |
//! | DOCX | the record itself | fixed single-column word-processor layout |
//!
//! The PDF looks exactly like the preview but its text is not selectable.
//! The DOCX ignores the selected template entirely so that it stays editable
//! in any word processor.
//!
//! Exports never touch the record. The session owns the in-flight guard and
//! the failure alert; adapters only return bytes or an [`ExportError`].

pub mod docx;
pub mod pdf;

use crate::config::RevampConfig;
use crate::error::ExportError;
use crate::record::ResumeRecord;
use crate::template::{RenderMode, Template};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Pdf,
    Docx,
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportKind::Pdf => "application/pdf",
            ExportKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Alert shown when this kind of export fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            ExportKind::Pdf => "Failed to generate PDF. Please try again.",
            ExportKind::Docx => "Failed to generate DOCX. Please try again.",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Pdf => f.write_str("PDF"),
            ExportKind::Docx => f.write_str("DOCX"),
        }
    }
}

/// `<full name, whitespace runs → "_">_Resume.<ext>`
///
/// Only whitespace is replaced; other characters pass through as typed.
pub fn export_filename(full_name: &str, kind: ExportKind) -> String {
    format!(
        "{}_Resume.{}",
        RE_WHITESPACE.replace_all(full_name, "_"),
        kind.extension()
    )
}

/// Everything an adapter needs, captured when the export was requested.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub kind: ExportKind,
    pub record: Arc<ResumeRecord>,
    pub template: Template,
    pub mode: RenderMode,
}

impl ExportRequest {
    pub fn filename(&self) -> String {
        export_filename(&self.record.full_name, self.kind)
    }
}

/// A finished export, ready to be written or offered for download.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub kind: ExportKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("kind", &self.kind)
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Produces the bytes of an export.
///
/// [`DocumentExporter`] is the real implementation; tests inject stubs to
/// exercise the session's guard and alert handling.
#[async_trait]
pub trait ExportBackend: Send + Sync {
    async fn export(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError>;
}

/// The built-in PDF and DOCX adapters.
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    export_scale: f32,
    export_font: Option<PathBuf>,
}

impl DocumentExporter {
    pub fn new(config: &RevampConfig) -> Self {
        Self {
            export_scale: config.export_scale,
            export_font: config.export_font.clone(),
        }
    }

    /// Run an export and wrap the result with its download name.
    pub async fn export_artifact(
        &self,
        request: &ExportRequest,
    ) -> Result<ExportArtifact, ExportError> {
        let bytes = self.export(request).await?;
        Ok(ExportArtifact {
            kind: request.kind,
            filename: request.filename(),
            bytes,
        })
    }
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self::new(&RevampConfig::default())
    }
}

#[async_trait]
impl ExportBackend for DocumentExporter {
    async fn export(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
        let bytes = match request.kind {
            ExportKind::Pdf => {
                pdf::export_pdf(
                    request.record.as_ref(),
                    &request.template,
                    request.mode,
                    self.export_scale,
                    self.export_font.as_deref(),
                )
                .await?
            }
            ExportKind::Docx => docx::export_docx(request.record.as_ref())?,
        };
        info!(
            "{} export for '{}' → {} bytes",
            request.kind,
            request.record.full_name,
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_replaces_whitespace_runs() {
        assert_eq!(export_filename("Alex Morgan", ExportKind::Pdf), "Alex_Morgan_Resume.pdf");
        assert_eq!(
            export_filename("Jo  Ann\tLee", ExportKind::Docx),
            "Jo_Ann_Lee_Resume.docx"
        );
    }

    #[test]
    fn filename_keeps_other_characters() {
        assert_eq!(export_filename("O'Brien-Smith", ExportKind::Pdf), "O'Brien-Smith_Resume.pdf");
        assert_eq!(export_filename("", ExportKind::Docx), "_Resume.docx");
    }

    #[test]
    fn failure_messages() {
        assert_eq!(
            ExportKind::Pdf.failure_message(),
            "Failed to generate PDF. Please try again."
        );
        assert_eq!(
            ExportKind::Docx.failure_message(),
            "Failed to generate DOCX. Please try again."
        );
    }

    #[tokio::test]
    async fn docx_artifact_is_named_after_the_record() {
        let request = ExportRequest {
            kind: ExportKind::Docx,
            record: Arc::new(crate::record::sample()),
            template: Template::default(),
            mode: RenderMode::Print,
        };
        let artifact = DocumentExporter::default()
            .export_artifact(&request)
            .await
            .unwrap();
        assert_eq!(artifact.filename, "Alex_Morgan_Resume.docx");
        assert_eq!(&artifact.bytes[..2], b"PK");
    }
}
