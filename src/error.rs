//! Error types for the resume-revamp library.
//!
//! Every failure in this crate is recoverable from the session's point of
//! view: the user lands back on a usable screen and can try again. The types
//! still differ by where the failure happened, because the session turns each
//! class into a different transition:
//!
//! * [`InputError`]: the source file or URL could not be read.
//! * [`ExtractionError`]: the model could not produce a usable record.
//! * [`ExportError`]: a PDF or DOCX could not be produced.
//! * [`EditError`]: an edit addressed something that does not exist.
//!
//! [`RevampError`] wraps them for library entry points that span stages.

use std::path::PathBuf;
use thiserror::Error;

/// Short message shown on the upload screen after a read failure.
pub const READ_FAILED_MESSAGE: &str = "Failed to read file.";

/// Short message shown on the upload screen after an extraction failure.
/// The underlying cause is logged, never shown.
pub const EXTRACTION_FAILED_MESSAGE: &str = "Failed to process resume. Please try again.";

/// Umbrella error for entry points that span several stages.
#[derive(Debug, Error)]
pub enum RevampError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Edit(#[from] EditError),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reading the resume source failed.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input string is neither a readable path nor an HTTP(S) URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The source was read but held no bytes.
    #[error("'{source_name}' is empty")]
    Empty { source_name: String },
}

/// The extraction collaborator did not produce a usable record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// Only raised when a client-side timeout was configured.
    #[error("Extraction call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("The model returned an empty response")]
    EmptyResponse,

    /// The response was not a decodable resume record.
    #[error("Malformed model response: {detail}")]
    MalformedResponse { detail: String },

    /// The record decoded but its contact e-mail is blank.
    #[error("The model response has no contact e-mail")]
    MissingEmail,

    #[error("Unsupported input type '{mime_type}' for '{name}'\nUse a PDF, an image, or plain text.")]
    UnsupportedInput { name: String, mime_type: String },

    /// pdfium could not bind, open, or rasterise the source PDF.
    #[error("Could not rasterise page {page} of the source PDF: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// An export adapter failed. The record is never touched by an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first use.\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumUnavailable(String),

    /// Painting or rasterising the rendered template failed.
    #[error("Rasterisation failed: {0}")]
    Rasterisation(String),

    /// The configured export font could not be read or embedded.
    #[error("Cannot load export font '{path}': {detail}")]
    FontUnavailable { path: String, detail: String },

    /// Assembling the paginated PDF failed.
    #[error("PDF encoding failed: {0}")]
    Encoding(String),

    /// Building the DOCX package failed.
    #[error("DOCX packaging failed: {0}")]
    Packaging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// An edit could not be applied; the record is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("No {list} entry at index {index} (list has {len})")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },

    /// A textual edit could not be parsed.
    #[error("Cannot parse edit '{input}': {reason}")]
    Syntax { input: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_display() {
        let e = EditError::IndexOutOfRange {
            list: "experience",
            index: 4,
            len: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("experience"), "got: {msg}");
        assert!(msg.contains("index 4"), "got: {msg}");
    }

    #[test]
    fn unsupported_input_display() {
        let e = ExtractionError::UnsupportedInput {
            name: "cv.xlsx".into(),
            mime_type: "application/vnd.ms-excel".into(),
        };
        assert!(e.to_string().contains("cv.xlsx"));
    }

    #[test]
    fn revamp_error_is_transparent() {
        let e: RevampError = ExportError::Packaging("zip".into()).into();
        assert_eq!(e.to_string(), "DOCX packaging failed: zip");
    }

    #[test]
    fn download_timeout_display() {
        let e = InputError::DownloadTimeout {
            url: "https://x.test/cv.pdf".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }
}
