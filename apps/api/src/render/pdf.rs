//! Plain-text → PDF using the Helvetica core font (no embedding needed).
//!
//! A4 portrait, 12pt text on 14pt leading, 50pt margins. Text is word-wrapped with
//! `metrics::wrap_lines` and paginated; every page carries its own resources.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat, Stream};

use crate::render::metrics::wrap_lines;
use crate::render::{DocumentRenderer, RenderError};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 12;
const LEADING: i64 = 14;
const FONT_NAME: &[u8] = b"F1";

#[derive(Debug, Clone)]
pub struct PdfDocumentRenderer {
    lines_per_page: usize,
    text_width_em: f32,
}

impl Default for PdfDocumentRenderer {
    fn default() -> Self {
        let text_width_pt = (PAGE_WIDTH - 2 * MARGIN) as f32;
        let text_height_pt = (PAGE_HEIGHT - 2 * MARGIN) as f32;
        Self {
            lines_per_page: (text_height_pt / LEADING as f32).floor() as usize,
            text_width_em: text_width_pt / FONT_SIZE as f32,
        }
    }
}

impl PdfDocumentRenderer {
    pub fn paginate(&self, text: &str) -> Vec<Vec<String>> {
        wrap_lines(text, self.text_width_em)
            .chunks(self.lines_per_page)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    fn page_content(lines: &[String]) -> Content {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_NAME.to_vec()), Object::Integer(FONT_SIZE)],
            ),
            Operation::new("TL", vec![Object::Integer(LEADING)]),
            Operation::new(
                "Td",
                vec![
                    Object::Integer(MARGIN),
                    Object::Integer(PAGE_HEIGHT - MARGIN - FONT_SIZE),
                ],
            ),
        ];
        for line in lines {
            if !line.is_empty() {
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
                ));
            }
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));
        Content { operations }
    }

    fn build(&self, pages: &[Vec<String>]) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ];

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for lines in pages {
            let content = Self::page_content(lines)
                .encode()
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => media_box.clone(),
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(page_count),
                "MediaBox" => media_box,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}

impl DocumentRenderer for PdfDocumentRenderer {
    fn render(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        if text.trim().is_empty() {
            return Err(RenderError::EmptyDocument);
        }
        let pages = self.paginate(text);
        self.build(&pages)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}

/// Encodes text for a WinAnsiEncoding simple font. Latin-1 maps directly, the
/// common typographic punctuation LLMs emit maps to its cp1252 slot, and
/// everything else becomes `?`.
fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\t' => b' ',
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (' '..='~').contains(&c) => c as u8,
            c if ('\u{a0}'..='\u{ff}').contains(&c) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_valid_pdf_header() {
        let pdf = PdfDocumentRenderer::default()
            .render("Jane Doe\nData Scientist")
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        assert!(Document::load_mem(&pdf).is_ok());
    }

    #[test]
    fn test_empty_text_rejected() {
        let result = PdfDocumentRenderer::default().render("  \n ");
        assert!(matches!(result, Err(RenderError::EmptyDocument)));
    }

    #[test]
    fn test_long_text_spans_multiple_pages() {
        let renderer = PdfDocumentRenderer::default();
        let text = "A line of the tailored CV.\n".repeat(200);
        let pages = renderer.paginate(&text);
        assert_eq!(pages.len(), 200_usize.div_ceil(renderer.lines_per_page));

        let pdf = renderer.render(&text).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), pages.len());
    }

    #[test]
    fn test_default_layout() {
        let renderer = PdfDocumentRenderer::default();
        // (842 - 100) / 14 = 53 lines; (595 - 100) / 12 = 41.25em
        assert_eq!(renderer.lines_per_page, 53);
        assert!((renderer.text_width_em - 41.25).abs() < 1e-4);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Abc"), b"Abc".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("\t"), b" ".to_vec());
    }
}
