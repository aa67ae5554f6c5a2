// Document rendering: tailored CV text → downloadable PDF.
// Rendering is CPU-bound; callers run it inside tokio::task::spawn_blocking.

pub mod metrics;
pub mod pdf;

use thiserror::Error;

pub use pdf::PdfDocumentRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to render")]
    EmptyDocument,

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, text: &str) -> Result<Vec<u8>, RenderError>;

    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;
}
