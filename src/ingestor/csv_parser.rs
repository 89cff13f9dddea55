//! Equipment CSV parser
//!
//! Validates every field of every row before anything is handed on; a single
//! bad row rejects the whole upload.

use csv::StringRecord;
use tracing::debug;

use super::column_mapping::{ColumnMapping, EquipmentColumn};
use crate::errors::{ParseError, ParseResult};
use crate::models::EquipmentRecord;

/// Default cap on data rows accepted from a single upload
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Parser for equipment CSV uploads
#[derive(Debug, Clone)]
pub struct CsvParser {
    max_rows: usize,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

impl CsvParser {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Parse raw upload bytes into records, preserving file order
    pub fn parse(&self, bytes: &[u8]) -> ParseResult<Vec<EquipmentRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| ParseError::Malformed {
                message: format!("failed to read header row: {}", e),
            })?
            .clone();

        if headers.iter().all(|h| h.trim_start_matches('\u{feff}').is_empty()) {
            return Err(ParseError::EmptyFile);
        }

        let mapping = ColumnMapping::analyze(&headers)?;

        let mut records = Vec::new();
        for (offset, result) in reader.records().enumerate() {
            let row_index = offset + 1;
            if row_index > self.max_rows {
                return Err(ParseError::TooManyRows {
                    limit: self.max_rows,
                });
            }

            let row = result.map_err(|e| ParseError::invalid_row(row_index, "row", e.to_string()))?;
            records.push(parse_row(&row, &mapping, row_index)?);
        }

        if records.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        debug!("Parsed {} equipment records", records.len());
        Ok(records)
    }
}

fn parse_row(
    row: &StringRecord,
    mapping: &ColumnMapping,
    row_index: usize,
) -> ParseResult<EquipmentRecord> {
    Ok(EquipmentRecord {
        equipment_name: text_field(row, mapping, EquipmentColumn::Name, row_index)?,
        equipment_type: text_field(row, mapping, EquipmentColumn::Type, row_index)?,
        flowrate: numeric_field(row, mapping, EquipmentColumn::Flowrate, row_index, false)?,
        pressure: numeric_field(row, mapping, EquipmentColumn::Pressure, row_index, false)?,
        temperature: numeric_field(row, mapping, EquipmentColumn::Temperature, row_index, true)?,
    })
}

fn raw_field<'r>(
    row: &'r StringRecord,
    mapping: &ColumnMapping,
    column: EquipmentColumn,
    row_index: usize,
) -> ParseResult<&'r str> {
    row.get(mapping.get_index(column))
        .map(str::trim)
        .ok_or_else(|| ParseError::invalid_row(row_index, column.field_name(), "value is missing"))
}

fn text_field(
    row: &StringRecord,
    mapping: &ColumnMapping,
    column: EquipmentColumn,
    row_index: usize,
) -> ParseResult<String> {
    let value = raw_field(row, mapping, column, row_index)?;
    if value.is_empty() {
        return Err(ParseError::invalid_row(
            row_index,
            column.field_name(),
            "value must not be empty",
        ));
    }
    Ok(value.to_string())
}

fn numeric_field(
    row: &StringRecord,
    mapping: &ColumnMapping,
    column: EquipmentColumn,
    row_index: usize,
    allow_negative: bool,
) -> ParseResult<f64> {
    let field = column.field_name();
    let value = raw_field(row, mapping, column, row_index)?;

    if value.is_empty() {
        return Err(ParseError::invalid_row(row_index, field, "value is required"));
    }

    let number: f64 = value
        .parse()
        .map_err(|_| ParseError::invalid_row(row_index, field, format!("'{}' is not a number", value)))?;

    if !number.is_finite() {
        return Err(ParseError::invalid_row(
            row_index,
            field,
            format!("'{}' is not a finite number", value),
        ));
    }
    if !allow_negative && number < 0.0 {
        return Err(ParseError::invalid_row(
            row_index,
            field,
            format!("{} must not be negative", value),
        ));
    }

    Ok(number)
}
