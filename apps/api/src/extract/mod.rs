//! PDF → plain text.
//!
//! Parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`. A panic
//! inside the parser (malformed input) surfaces as `UnreadablePdf`, not a crash.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unreadable PDF: {0}")]
    UnreadablePdf(String),
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractError>;
}

pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::UnreadablePdf("file is empty".to_string()));
        }
        if !looks_like_pdf(&bytes) {
            return Err(ExtractError::UnreadablePdf(
                "file is not a PDF document".to_string(),
            ));
        }

        let size = bytes.len();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractError::UnreadablePdf(format!("PDF parser aborted: {e}")))?
            .map_err(|e| ExtractError::UnreadablePdf(e.to_string()))?;

        let text = normalize_text(&text);
        if text.is_empty() {
            // Scanned or image-only documents carry no text layer.
            return Err(ExtractError::UnreadablePdf(
                "no extractable text (scanned or image-only PDF?)".to_string(),
            ));
        }

        debug!(bytes = size, chars = text.chars().count(), "extracted CV text");
        Ok(text)
    }
}

/// Leading bytes may include whitespace or a BOM before the header in the wild;
/// the header must appear within the first KiB.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Trims every line and collapses runs of blank lines to a single one.
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DocumentRenderer, PdfDocumentRenderer};

    #[tokio::test]
    async fn test_empty_upload_is_unreadable() {
        let err = PdfTextExtractor.extract(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, ExtractError::UnreadablePdf(_)));
    }

    #[tokio::test]
    async fn test_non_pdf_is_unreadable() {
        let err = PdfTextExtractor
            .extract(Bytes::from_static(b"Name: Jane\nSkills: Python"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a PDF"));
    }

    #[tokio::test]
    async fn test_truncated_pdf_is_unreadable() {
        let err = PdfTextExtractor
            .extract(Bytes::from_static(b"%PDF-1.5\n1 0 obj\n<< /Type /Catalog"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnreadablePdf(_)));
    }

    #[tokio::test]
    async fn test_extracts_text_from_rendered_pdf() {
        let pdf = PdfDocumentRenderer::default()
            .render("Experienced Python data scientist\nSkills: pandas")
            .unwrap();
        let text = PdfTextExtractor.extract(Bytes::from(pdf)).await.unwrap();
        assert!(text.contains("Experienced"), "got: {text:?}");
        assert!(text.contains("pandas"), "got: {text:?}");
    }

    #[test]
    fn test_magic_detection() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(looks_like_pdf(b"\xef\xbb\xbf%PDF-1.4"));
        assert!(!looks_like_pdf(b"PK\x03\x04 zip"));
    }

    #[test]
    fn test_normalize_text() {
        let raw = "  Jane Doe  \n\n\n\n Data Scientist\n  \nPython ";
        assert_eq!(normalize_text(raw), "Jane Doe\n\nData Scientist\n\nPython");
        assert_eq!(normalize_text(" \n \n"), "");
    }
}
