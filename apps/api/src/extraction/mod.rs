//! Best-effort plain text from uploaded résumé and job-description files.
//!
//! `TextExtractor::extract` never fails. Every format path is an ordered list of
//! strategies, each returning text or a reason; the first success wins and each
//! miss is logged as a degraded extraction. The last resort is always the raw
//! bytes decoded as text with invalid sequences discarded. An empty string is the
//! signal callers treat as "nothing could be extracted".

pub mod docx;
pub mod pdf;
pub mod plain;

use std::path::Path;

use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Magic bytes at the start of every PDF file.
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Format chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
    Unknown,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => DocumentFormat::Pdf,
            // Legacy .doc goes down the DOCX path and degrades to raw text.
            "docx" | "doc" => DocumentFormat::Docx,
            "txt" | "text" | "md" | "csv" => DocumentFormat::PlainText,
            _ => DocumentFormat::Unknown,
        }
    }
}

/// Why a single extraction strategy produced nothing.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("not a readable archive: {0}")]
    Archive(String),

    #[error("archive is missing required entry '{0}'")]
    MissingEntry(&'static str),

    #[error("PDF could not be parsed: {0}")]
    Pdf(String),

    #[error("document markup could not be parsed: {0}")]
    Markup(String),

    #[error("strategy produced no text")]
    Empty,
}

pub(crate) type Strategy = fn(&[u8]) -> Result<String, StrategyError>;

/// Runs `strategies` in order and returns the first success.
pub(crate) fn cascade(
    format: &'static str,
    bytes: &[u8],
    strategies: &[(&'static str, Strategy)],
) -> Result<String, StrategyError> {
    let mut last = StrategyError::Empty;
    for (position, (name, strategy)) in strategies.iter().enumerate() {
        match strategy(bytes) {
            Ok(text) => {
                if position > 0 {
                    info!(format, strategy = name, "Degraded extraction succeeded");
                }
                return Ok(text);
            }
            Err(e) => {
                warn!(format, strategy = name, "Extraction strategy failed: {e}");
                last = e;
            }
        }
    }
    Err(last)
}

/// Format-detecting text extractor. Stateless; cheap to copy into blocking tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts text from `bytes`, choosing the strategy from `filename`'s extension
    /// and falling back to content sniffing for unknown extensions.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> String {
        let _span = tracing::info_span!("extract_text", filename).entered();

        let format = DocumentFormat::from_filename(filename);
        let text = match format {
            DocumentFormat::Pdf => pdf::extract(bytes),
            DocumentFormat::Docx => docx::extract(bytes),
            DocumentFormat::PlainText => plain::decode(bytes),
            DocumentFormat::Unknown => {
                warn!("Unknown file extension, detecting format from content");
                sniff_and_extract(bytes)
            }
        };

        if text.trim().is_empty() {
            error!(?format, "No text could be extracted");
        } else {
            debug!(?format, chars = text.len(), "Extracted text");
        }
        text
    }

    /// Reads `path` and extracts its text. A missing or unreadable file yields "".
    pub fn extract_file(&self, path: &Path) -> String {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        match std::fs::read(path) {
            Ok(bytes) => self.extract(&bytes, filename),
            Err(e) => {
                error!("Could not read {}: {e}", path.display());
                String::new()
            }
        }
    }
}

fn sniff_and_extract(bytes: &[u8]) -> String {
    if docx::is_archive(bytes) {
        info!("Content is a ZIP archive, using the DOCX path");
        return docx::extract(bytes);
    }
    if bytes.starts_with(PDF_SIGNATURE) {
        info!("Content carries the PDF signature, using the PDF path");
        return pdf::extract(bytes);
    }

    let paths: [(&str, fn(&[u8]) -> String); 3] = [
        ("pdf", pdf::extract),
        ("docx", docx::extract),
        ("plain", plain::decode),
    ];
    for (name, path) in paths {
        let text = path(bytes);
        if !text.trim().is_empty() {
            info!(path = name, "Extracted text from undetected format");
            return text;
        }
    }

    error!("Could not extract text with any method");
    String::new()
}
