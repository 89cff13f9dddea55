//! Page layout for dataset reports
//!
//! Coordinates are millimetres from the bottom-left corner of an A4 page,
//! matching PDF user space.

use crate::errors::{ReportError, ReportResult};
use crate::models::Dataset;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const MARGIN_MM: f32 = 20.0;
const TOP_MM: f32 = PAGE_HEIGHT_MM - MARGIN_MM;
const INDENT_MM: f32 = MARGIN_MM + 6.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 9.0;

/// Table columns: x offset and maximum characters
const TABLE_COLUMNS: [(f32, usize); 5] = [
    (MARGIN_MM, 28),
    (MARGIN_MM + 58.0, 20),
    (MARGIN_MM + 100.0, 12),
    (MARGIN_MM + 125.0, 12),
    (MARGIN_MM + 150.0, 12),
];
const TABLE_HEADERS: [&str; 5] = [
    "Equipment Name",
    "Type",
    "Flowrate (m3/h)",
    "Pressure (bar)",
    "Temp (degC)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedText {
    pub x_mm: f32,
    pub y_mm: f32,
    pub size: f32,
    pub style: FontStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    pub items: Vec<PositionedText>,
}

/// Writes lines top to bottom, starting a new page when one fills
struct Cursor {
    pages: Vec<ReportPage>,
    y_mm: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![ReportPage::default()],
            y_mm: TOP_MM,
        }
    }

    /// Vertical space taken by a line of text at `size` points
    fn line_height(size: f32) -> f32 {
        // 1 pt = 0.3528 mm, plus leading
        size * 0.3528 * 1.5
    }

    fn fits(&self, height: f32) -> bool {
        self.y_mm - height >= MARGIN_MM
    }

    fn new_page(&mut self) {
        self.pages.push(ReportPage::default());
        self.y_mm = TOP_MM;
    }

    fn ensure_room(&mut self, height: f32) {
        if !self.fits(height) {
            self.new_page();
        }
    }

    fn place(&mut self, x_mm: f32, size: f32, style: FontStyle, text: String) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(PositionedText {
                x_mm,
                y_mm: self.y_mm,
                size,
                style,
                text,
            });
        }
    }

    fn line(&mut self, x_mm: f32, size: f32, style: FontStyle, text: impl Into<String>) {
        let height = Self::line_height(size);
        self.ensure_room(height);
        self.y_mm -= height;
        self.place(x_mm, size, style, text.into());
    }

    fn gap(&mut self, mm: f32) {
        self.y_mm -= mm;
    }

    /// A row of table cells sharing one baseline
    fn row(&mut self, cells: [String; 5], style: FontStyle) {
        let height = Self::line_height(TABLE_SIZE);
        self.ensure_room(height);
        self.y_mm -= height;
        for ((x_mm, max_chars), cell) in TABLE_COLUMNS.iter().zip(cells) {
            self.place(*x_mm, TABLE_SIZE, style, truncate(&cell, *max_chars));
        }
    }

    fn finish(self) -> Vec<ReportPage> {
        self.pages
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    shortened.push_str("...");
    shortened
}

fn table_header() -> [String; 5] {
    TABLE_HEADERS.map(str::to_string)
}

/// Lay out the report for `dataset`
///
/// Fails with [`ReportError::EmptyDataset`] when there are no records.
pub fn layout(dataset: &Dataset) -> ReportResult<Vec<ReportPage>> {
    if dataset.records.is_empty() {
        return Err(ReportError::EmptyDataset {
            dataset_id: dataset.id,
        });
    }

    let summary = &dataset.summary;
    let mut cursor = Cursor::new();

    cursor.line(
        MARGIN_MM,
        TITLE_SIZE,
        FontStyle::Bold,
        "Chemical Equipment Parameter Report",
    );
    cursor.gap(2.0);
    cursor.line(MARGIN_MM, BODY_SIZE, FontStyle::Regular, format!("Dataset: {}", dataset.name));
    cursor.line(
        MARGIN_MM,
        BODY_SIZE,
        FontStyle::Regular,
        format!(
            "Upload Time: {}",
            dataset.upload_time.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    );
    cursor.line(
        MARGIN_MM,
        BODY_SIZE,
        FontStyle::Regular,
        format!("Total Equipment: {}", dataset.row_count),
    );

    cursor.gap(4.0);
    cursor.line(MARGIN_MM, HEADING_SIZE, FontStyle::Bold, "Summary Statistics");
    cursor.line(
        INDENT_MM,
        BODY_SIZE,
        FontStyle::Regular,
        format!("Average Flowrate: {:.2} m3/h", summary.avg_flowrate),
    );
    cursor.line(
        INDENT_MM,
        BODY_SIZE,
        FontStyle::Regular,
        format!("Average Pressure: {:.2} bar", summary.avg_pressure),
    );
    cursor.line(
        INDENT_MM,
        BODY_SIZE,
        FontStyle::Regular,
        format!("Average Temperature: {:.2} degC", summary.avg_temperature),
    );

    cursor.gap(4.0);
    cursor.line(MARGIN_MM, HEADING_SIZE, FontStyle::Bold, "Type Distribution");
    for (equipment_type, count) in &summary.type_distribution {
        cursor.line(
            INDENT_MM,
            BODY_SIZE,
            FontStyle::Regular,
            format!("{}: {}", equipment_type, count),
        );
    }

    cursor.gap(4.0);
    cursor.line(MARGIN_MM, HEADING_SIZE, FontStyle::Bold, "Equipment");
    cursor.row(table_header(), FontStyle::Bold);
    for record in &dataset.records {
        let cells = [
            record.equipment_name.clone(),
            record.equipment_type.clone(),
            format!("{:.2}", record.flowrate),
            format!("{:.2}", record.pressure),
            format!("{:.2}", record.temperature),
        ];
        // Continuation pages repeat the table header
        if !cursor.fits(Cursor::line_height(TABLE_SIZE)) {
            cursor.new_page();
            cursor.row(table_header(), FontStyle::Bold);
        }
        cursor.row(cells, FontStyle::Regular);
    }

    Ok(cursor.finish())
}
