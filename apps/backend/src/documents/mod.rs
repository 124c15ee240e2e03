//! Upload validation and plain-text extraction for résumé documents.

mod docx;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid file type ({0}). Only PDF and DOCX files are allowed.")]
    InvalidFileType(String),

    #[error("Uploaded file is empty")]
    Empty,

    #[error("File is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Could not read document: {0}")]
    Unreadable(String),

    #[error("Could not extract any text from the document")]
    NoText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }

    fn from_mime(content_type: &str) -> Option<Self> {
        // Ignore parameters such as `; charset=binary`
        let essence = content_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(DocumentKind::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }
}

/// Checks the declared type and size of an upload.
///
/// The declared content type wins. Generic types (`application/octet-stream`
/// or none at all) fall back to the file extension.
pub fn validate_upload(
    filename: Option<&str>,
    content_type: Option<&str>,
    size: usize,
    max_bytes: usize,
) -> Result<DocumentKind, DocumentError> {
    let kind = match content_type {
        Some(ct) if !ct.trim().is_empty() && !ct.starts_with("application/octet-stream") => {
            DocumentKind::from_mime(ct)
        }
        _ => filename.and_then(DocumentKind::from_filename),
    };

    let kind = kind.ok_or_else(|| {
        DocumentError::InvalidFileType(
            content_type
                .or(filename)
                .unwrap_or("unknown")
                .to_string(),
        )
    })?;

    if size == 0 {
        return Err(DocumentError::Empty);
    }
    if size > max_bytes {
        return Err(DocumentError::TooLarge {
            size,
            max: max_bytes,
        });
    }

    Ok(kind)
}

/// Extracts plain text from a validated document. CPU bound; call from a
/// blocking task.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, DocumentError> {
    let text = match kind {
        DocumentKind::Pdf => {
            if !bytes.starts_with(b"%PDF") {
                return Err(DocumentError::Unreadable(
                    "file does not start with a PDF header".to_string(),
                ));
            }
            extract_pdf(bytes)?
        }
        DocumentKind::Docx => docx::extract_text(bytes)?,
    };

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(DocumentError::NoText);
    }
    Ok(text)
}

/// pdf-extract panics on some malformed documents (unresolved fonts, fonts
/// without a base font). Those count as unreadable uploads.
fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocumentError::Unreadable(e.to_string())),
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown cause".to_string());
            warn!("PDF extraction panicked: {reason}");
            Err(DocumentError::Unreadable(
                "the PDF structure is damaged or uses unsupported fonts".to_string(),
            ))
        }
    }
}

/// Trims each line and collapses runs of blank lines to a single blank line.
fn normalize_whitespace(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(if blank { "" } else { line });
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
