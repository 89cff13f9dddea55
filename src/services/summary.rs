//! Summary statistics over a validated record set

use std::collections::BTreeMap;

use crate::models::{DatasetSummary, EquipmentRecord};

/// Computes [`DatasetSummary`] values; stateless
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Means of the numeric fields and per-type counts.
    ///
    /// Returns `None` for an empty slice, where averages are undefined.
    /// Types are counted by exact string equality.
    pub fn summarize(records: &[EquipmentRecord]) -> Option<DatasetSummary> {
        if records.is_empty() {
            return None;
        }

        // Each term is scaled before summing so finite inputs near f64::MAX
        // cannot overflow the total
        let count = records.len() as f64;
        let mut flowrate = 0.0;
        let mut pressure = 0.0;
        let mut temperature = 0.0;
        let mut type_distribution: BTreeMap<String, usize> = BTreeMap::new();

        for record in records {
            flowrate += record.flowrate / count;
            pressure += record.pressure / count;
            temperature += record.temperature / count;
            *type_distribution
                .entry(record.equipment_type.clone())
                .or_insert(0) += 1;
        }

        Some(DatasetSummary {
            total_count: records.len(),
            avg_flowrate: flowrate,
            avg_pressure: pressure,
            avg_temperature: temperature,
            type_distribution,
        })
    }
}
