use std::io::Write;
use std::path::Path;
use std::time::Duration;

use pdf_oxide::PdfDocument;
use tracing::debug;

use super::FetchError;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Writes the download to a temp file and extracts text page by page on a
/// blocking thread. Pages without text are dropped; the rest are joined
/// with newlines.
pub(super) async fn extract_text(bytes: &[u8]) -> Result<String, FetchError> {
    let mut file = tempfile::Builder::new()
        .prefix("fundscout-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| FetchError::Pdf(format!("failed to create temp file: {e}")))?;
    file.write_all(bytes)
        .map_err(|e| FetchError::Pdf(format!("failed to write temp file: {e}")))?;

    let path = file.path().to_path_buf();
    let pages = tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        tokio::task::spawn_blocking(move || read_pages(&path)),
    )
    .await
    .map_err(|_| FetchError::Timeout)?
    .map_err(|e| FetchError::Pdf(format!("extraction task failed: {e}")))??;

    debug!(pages = pages.len(), "pdf text extracted");
    Ok(pages.join("\n"))
}

fn read_pages(path: &Path) -> Result<Vec<String>, FetchError> {
    let mut doc = PdfDocument::open(path)
        .map_err(|e| FetchError::Pdf(format!("failed to parse PDF: {e}")))?;
    let page_count = doc
        .page_count()
        .map_err(|e| FetchError::Pdf(format!("failed to read page count: {e}")))?;

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let text = doc.extract_text(index).unwrap_or_default();
        let text = text.trim();
        if !text.is_empty() {
            pages.push(text.to_string());
        }
    }
    Ok(pages)
}
