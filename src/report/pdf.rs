//! PDF rendering of report layouts using printpdf's builtin Helvetica faces

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use tracing::debug;

use super::layout::{layout, FontStyle, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::ReportRenderer;
use crate::errors::{ReportError, ReportResult};
use crate::models::Dataset;

const LAYER_NAME: &str = "Report";

/// Renders dataset reports as A4 PDF documents
#[derive(Debug, Clone, Default)]
pub struct PdfReportGenerator;

impl PdfReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

/// Builtin PDF fonts only cover a single-byte encoding
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

impl ReportRenderer for PdfReportGenerator {
    fn render(&self, dataset: &Dataset) -> ReportResult<Vec<u8>> {
        let pages = layout(dataset)?;

        let title = format!("Equipment Report - {}", sanitize(&dataset.name));
        let (doc, first_page, first_layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );

        let regular: IndirectFontRef = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::render(e.to_string()))?;
        let bold: IndirectFontRef = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::render(e.to_string()))?;

        for (index, page) in pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for item in &page.items {
                let font = match item.style {
                    FontStyle::Regular => &regular,
                    FontStyle::Bold => &bold,
                };
                layer.use_text(
                    sanitize(&item.text),
                    item.size,
                    Mm(item.x_mm),
                    Mm(item.y_mm),
                    font,
                );
            }
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ReportError::render(e.to_string()))?;

        debug!(
            "Rendered report for dataset {}: {} pages, {} bytes",
            dataset.id,
            pages.len(),
            bytes.len()
        );

        Ok(bytes)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}
