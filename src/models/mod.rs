use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One validated equipment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,    // m3/h
    pub pressure: f64,    // bar
    pub temperature: f64, // degC
}

/// Aggregate statistics derived from a dataset's records
///
/// `type_distribution` is a `BTreeMap` so JSON output and reports list the
/// types in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: BTreeMap<String, usize>,
}

impl DatasetSummary {
    /// Sum of all type counts, equal to the number of records summarized
    pub fn distribution_total(&self) -> usize {
        self.type_distribution.values().sum()
    }
}

/// A persisted upload
///
/// Serializes to the shape returned by both the upload and detail endpoints:
/// `{id, name, upload_time, row_count, summary, equipment}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub upload_time: DateTime<Utc>,
    pub row_count: usize,
    pub summary: DatasetSummary,
    #[serde(rename = "equipment")]
    pub records: Vec<EquipmentRecord>,
}

impl Dataset {
    pub fn list_item(&self) -> DatasetListItem {
        DatasetListItem {
            id: self.id,
            name: self.name.clone(),
            upload_time: self.upload_time,
            row_count: self.row_count,
            summary: self.summary.clone(),
        }
    }
}

/// Dataset metadata and summary without records, used by the history listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetListItem {
    pub id: i64,
    pub name: String,
    pub upload_time: DateTime<Utc>,
    pub row_count: usize,
    pub summary: DatasetSummary,
}
