use tracing::{error, warn};

use crate::extraction::{cascade, StrategyError, PDF_SIGNATURE};

const EOF_MARKER: &[u8] = b"%%EOF";

/// Extracts text page by page, retrying once in permissive mode when the
/// document cannot be opened strictly. Returns "" when both fail.
pub fn extract(bytes: &[u8]) -> String {
    cascade(
        "pdf",
        bytes,
        &[("page-by-page", extract_pages), ("permissive", extract_permissive)],
    )
    .unwrap_or_else(|e| {
        error!("PDF extraction failed: {e}");
        String::new()
    })
}

/// Strict path: open with lopdf and extract each page on its own, skipping pages
/// that fail. A document with zero pages is a success with no text.
fn extract_pages(bytes: &[u8]) -> Result<String, StrategyError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| StrategyError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        warn!("PDF has no pages");
        return Ok(String::new());
    }

    let mut text = String::new();
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => warn!(page = page_number, "Skipping unreadable PDF page: {e}"),
        }
    }

    Ok(text.trim().to_string())
}

/// Permissive path: drop anything before the `%PDF` header and after the last
/// `%%EOF`, then hand the body to pdf-extract, which tolerates more damage.
fn extract_permissive(bytes: &[u8]) -> Result<String, StrategyError> {
    let body = realign(bytes)
        .ok_or_else(|| StrategyError::Pdf("no PDF header found".to_string()))?;

    // pdf-extract panics on some malformed inputs instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(body)) {
        Ok(Ok(text)) => Ok(text.trim().to_string()),
        Ok(Err(e)) => Err(StrategyError::Pdf(e.to_string())),
        Err(_) => Err(StrategyError::Pdf("permissive parser aborted".to_string())),
    }
}

fn realign(bytes: &[u8]) -> Option<&[u8]> {
    let start = find(bytes, PDF_SIGNATURE)?;
    let body = &bytes[start..];
    let end = rfind(body, EOF_MARKER)
        .map(|pos| pos + EOF_MARKER.len())
        .unwrap_or(body.len());
    Some(&body[..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
