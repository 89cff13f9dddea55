//! Upload ingestion
//!
//! Turns raw upload bytes into validated [`EquipmentRecord`]s. Parsing is
//! all-or-nothing: the first invalid row rejects the whole file.
//!
//! [`EquipmentRecord`]: crate::models::EquipmentRecord

pub mod column_mapping;
pub mod csv_parser;

pub use column_mapping::{ColumnMapping, EquipmentColumn};
pub use csv_parser::CsvParser;
