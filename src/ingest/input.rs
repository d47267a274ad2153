//! Source resolution: a local path or an HTTP(S) URL → [`SourceDocument`].
//!
//! The MIME type is sniffed from the content first (`%PDF`, PNG, JPEG, ...)
//! and only falls back to the file extension for formats without a magic
//! number, which in practice means plain text.

use super::SourceDocument;
use crate::error::InputError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read a local file or download a URL.
pub async fn read_source(input: &str, timeout_secs: u64) -> Result<SourceDocument, InputError> {
    let source = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else if input.contains("://") || input.trim().is_empty() {
        return Err(InputError::InvalidInput {
            input: input.to_string(),
        });
    } else {
        read_local(Path::new(input)).await?
    };

    if source.bytes.is_empty() {
        return Err(InputError::Empty {
            source_name: source.name,
        });
    }
    debug!(
        "Read '{}' ({} bytes, {})",
        source.name,
        source.bytes.len(),
        source.mime_type
    );
    Ok(source)
}

async fn read_local(path: &Path) -> Result<SourceDocument, InputError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => InputError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => InputError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => InputError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = detect_mime(&bytes, &name);
    Ok(SourceDocument::new(name, mime_type, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<SourceDocument, InputError> {
    info!("Downloading resume from: {}", url);

    let failed = |reason: String| InputError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            InputError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?.to_vec();
    let name = filename_from_url(url);

    let sniffed = detect_mime(&bytes, &name);
    let mime_type = match header_mime {
        Some(header) if sniffed == OCTET_STREAM => header,
        _ => sniffed,
    };

    info!("Downloaded {} bytes ({})", bytes.len(), mime_type);
    Ok(SourceDocument::new(name, mime_type, bytes))
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Content sniffing first, extension second.
pub fn detect_mime(bytes: &[u8], name: &str) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") | Some("text") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("pdf") => "application/pdf",
        _ if std::str::from_utf8(bytes).is_ok() => "text/plain",
        _ => OCTET_STREAM,
    }
    .to_string()
}

/// Last path segment of the URL, or a generic name.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "resume".to_string())
}
