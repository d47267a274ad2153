//! Ingestion: raw resume → [`ResumeRecord`] via an extraction collaborator.
//!
//! The session never talks to a model directly. It hands an
//! [`ExtractionInput`] to whatever [`ResumeExtractor`] it was built with: the
//! LLM-backed [`llm::LlmExtractor`] in production, or a stub in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (document?) ──▶ render ──▶ encode ──▶ llm ──▶ decode
//! (path/URL)   │            (pdfium)   (base64)   (chat)  (fences + serde)
//!              └── text ───────────────────────────┘
//! ```
//!
//! 1. [`input`]: read a local path or URL into bytes plus a MIME type
//! 2. [`render`]: rasterise every page of a PDF source; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`encode`]: PNG-encode and base64-wrap images for the vision request
//! 4. [`llm`]: one chat call; no retries, no default timeout
//! 5. [`decode`]: strip code fences and decode the JSON record

pub mod decode;
pub mod encode;
pub mod input;
pub mod llm;
pub mod render;

use crate::error::ExtractionError;
use crate::record::ResumeRecord;
use async_trait::async_trait;
use std::fmt;

/// A file that has been read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name or URL, for logs and error messages.
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_text(&self) -> bool {
        self.mime_type.starts_with("text/")
    }
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// What the collaborator is asked to turn into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionInput {
    Document(SourceDocument),
    Text(String),
}

/// The extraction capability.
///
/// One call per ingestion. Implementations must not retry on their own; a
/// failed extraction is re-triggered by the user.
#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(
        &self,
        input: ExtractionInput,
        job_description: Option<&str>,
    ) -> Result<ResumeRecord, ExtractionError>;
}
