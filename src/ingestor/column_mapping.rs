//! Header analysis for equipment CSV files
//!
//! Header names are matched case-insensitively and independent of column
//! order. Spacing, underscores and dashes are normalised before matching, so
//! `Equipment Name`, `equipment_name` and `EQUIPMENT-NAME` all resolve to the
//! same column. Columns that match nothing are ignored.

use csv::StringRecord;

use crate::errors::{ParseError, ParseResult};

/// The logical columns every upload must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentColumn {
    Name,
    Type,
    Flowrate,
    Pressure,
    Temperature,
}

impl EquipmentColumn {
    pub const ALL: [EquipmentColumn; 5] = [
        EquipmentColumn::Name,
        EquipmentColumn::Type,
        EquipmentColumn::Flowrate,
        EquipmentColumn::Pressure,
        EquipmentColumn::Temperature,
    ];

    /// Header name shown to users in error messages
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Name => "Equipment Name",
            Self::Type => "Type",
            Self::Flowrate => "Flowrate",
            Self::Pressure => "Pressure",
            Self::Temperature => "Temperature",
        }
    }

    /// Record field name used in row-level errors and JSON output
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Name => "equipment_name",
            Self::Type => "equipment_type",
            Self::Flowrate => "flowrate",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["equipment name", "name", "equipment"],
            Self::Type => &["type", "equipment type"],
            Self::Flowrate => &["flowrate", "flow rate", "flow"],
            Self::Pressure => &["pressure"],
            Self::Temperature => &["temperature", "temp"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Resolve a raw header cell to a column, if it names one
    pub fn from_header(header: &str) -> Option<Self> {
        let normalized = normalize_header(header);
        Self::ALL
            .into_iter()
            .find(|column| column.aliases().contains(&normalized.as_str()))
    }
}

/// Lowercase, strip a BOM, turn `_`/`-` into spaces and collapse whitespace
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position of each required column in the uploaded header row
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    indices: [usize; 5],
}

impl ColumnMapping {
    /// Analyze the header row; fails with the first required column that is
    /// missing, in canonical column order
    pub fn analyze(headers: &StringRecord) -> ParseResult<Self> {
        let mut found: [Option<usize>; 5] = [None; 5];

        for (position, header) in headers.iter().enumerate() {
            if let Some(column) = EquipmentColumn::from_header(header) {
                // First matching header wins
                found[column.index()].get_or_insert(position);
            }
        }

        let mut indices = [0usize; 5];
        for column in EquipmentColumn::ALL {
            indices[column.index()] = found[column.index()]
                .ok_or_else(|| ParseError::missing_column(column.display_name()))?;
        }

        Ok(Self { indices })
    }

    /// Index of `column` within each data row
    pub fn get_index(&self, column: EquipmentColumn) -> usize {
        self.indices[column.index()]
    }
}
