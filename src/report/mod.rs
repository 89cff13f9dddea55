//! Dataset reports
//!
//! Rendering is split in two: [`layout`] turns a dataset into positioned
//! lines of text on A4 pages, and a [`ReportRenderer`] paints those pages
//! into a document format. The layout is a pure function of the dataset, so
//! equal datasets always produce the same report content.

pub mod layout;
pub mod pdf;

pub use layout::{layout, FontStyle, PositionedText, ReportPage};
pub use pdf::PdfReportGenerator;

use crate::errors::ReportResult;
use crate::models::Dataset;

/// Renders a persisted dataset into a downloadable document
///
/// Implementations are CPU-bound and hold no per-request state, so one
/// instance is shared by every request.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, dataset: &Dataset) -> ReportResult<Vec<u8>>;

    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    /// File extension used in download names
    fn file_extension(&self) -> &'static str;
}
