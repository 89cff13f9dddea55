//! SQLite-backed dataset repository
//!
//! A dataset is one row in `datasets` plus one row per record in `equipment`,
//! keyed by `(dataset_id, position)` so records come back in upload order.
//! Upload times are stored as microseconds since the Unix epoch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::traits::DatasetStore;
use crate::database::Database;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Dataset, DatasetListItem, DatasetSummary, EquipmentRecord};

/// Repository implementation for datasets
#[derive(Clone)]
pub struct DatasetRepository {
    database: Database,
    pool: Pool<Sqlite>,
    history_limit: Option<usize>,
}

impl DatasetRepository {
    /// Create a new dataset repository; `history_limit` bounds how many of
    /// the most recent datasets are kept
    pub fn new(database: Database, history_limit: Option<usize>) -> Self {
        Self {
            pool: database.pool(),
            database,
            history_limit,
        }
    }

    async fn prune_history(
        &self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        saved_id: i64,
        limit: usize,
    ) -> RepositoryResult<u64> {
        // The dataset being saved always survives, even if the clock stepped back
        let keep = limit.max(1) as i64;
        let result = sqlx::query(
            "DELETE FROM datasets WHERE id != ? AND id NOT IN (
                 SELECT id FROM datasets ORDER BY upload_time DESC, id DESC LIMIT ?
             )",
        )
        .bind(saved_id)
        .bind(keep)
        .execute(&mut **tx)
        .await
        .map_err(|e| RepositoryError::query_failed("prune dataset history", e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// Current time truncated to the precision stored in the database
fn stored_now() -> DateTime<Utc> {
    micros_to_datetime(Utc::now().timestamp_micros()).unwrap_or_else(Utc::now)
}

fn micros_to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

fn decode_upload_time(row: &SqliteRow) -> RepositoryResult<DateTime<Utc>> {
    let micros: i64 = row.try_get("upload_time")?;
    micros_to_datetime(micros).ok_or_else(|| {
        RepositoryError::corrupt_record("datasets", format!("upload_time {} out of range", micros))
    })
}

fn decode_row_count(row: &SqliteRow) -> RepositoryResult<usize> {
    let row_count: i64 = row.try_get("row_count")?;
    usize::try_from(row_count).map_err(|_| {
        RepositoryError::corrupt_record("datasets", format!("negative row_count {}", row_count))
    })
}

fn decode_summary(row: &SqliteRow, row_count: usize) -> RepositoryResult<DatasetSummary> {
    let type_distribution: BTreeMap<String, usize> =
        serde_json::from_str(&row.try_get::<String, _>("type_distribution")?)?;
    Ok(DatasetSummary {
        total_count: row_count,
        avg_flowrate: row.try_get("avg_flowrate")?,
        avg_pressure: row.try_get("avg_pressure")?,
        avg_temperature: row.try_get("avg_temperature")?,
        type_distribution,
    })
}

fn decode_list_item(row: &SqliteRow) -> RepositoryResult<DatasetListItem> {
    let row_count = decode_row_count(row)?;
    Ok(DatasetListItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        upload_time: decode_upload_time(row)?,
        row_count,
        summary: decode_summary(row, row_count)?,
    })
}

fn decode_record(row: &SqliteRow) -> RepositoryResult<EquipmentRecord> {
    Ok(EquipmentRecord {
        equipment_name: row.try_get("equipment_name")?,
        equipment_type: row.try_get("equipment_type")?,
        flowrate: row.try_get("flowrate")?,
        pressure: row.try_get("pressure")?,
        temperature: row.try_get("temperature")?,
    })
}

#[async_trait]
impl DatasetStore for DatasetRepository {
    async fn save(
        &self,
        name: &str,
        records: &[EquipmentRecord],
        summary: &DatasetSummary,
    ) -> RepositoryResult<Dataset> {
        let type_distribution = serde_json::to_string(&summary.type_distribution)?;

        let _lock = self.database.acquire_write_lock().await;
        let upload_time = stored_now();

        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO datasets
             (name, upload_time, row_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(upload_time.timestamp_micros())
        .bind(records.len() as i64)
        .bind(summary.avg_flowrate)
        .bind(summary.avg_pressure)
        .bind(summary.avg_temperature)
        .bind(&type_distribution)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (position, record) in records.iter().enumerate() {
            sqlx::query(
                "INSERT INTO equipment
                 (dataset_id, position, equipment_name, equipment_type, flowrate, pressure, temperature)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(&record.equipment_name)
            .bind(&record.equipment_type)
            .bind(record.flowrate)
            .bind(record.pressure)
            .bind(record.temperature)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::query_failed(
                    format!("insert equipment row {} of dataset {}", position, id),
                    e.to_string(),
                )
            })?;
        }

        if let Some(limit) = self.history_limit {
            let pruned = self.prune_history(&mut tx, id, limit).await?;
            if pruned > 0 {
                debug!("Pruned {} datasets beyond history limit {}", pruned, limit);
            }
        }

        tx.commit().await?;

        info!(
            "Saved dataset {} ('{}') with {} records",
            id,
            name,
            records.len()
        );

        Ok(Dataset {
            id,
            name: name.to_string(),
            upload_time,
            row_count: records.len(),
            summary: summary.clone(),
            records: records.to_vec(),
        })
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Dataset>> {
        // One read transaction so the header and its records come from the
        // same snapshot even if a concurrent save prunes this dataset.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, name, upload_time, row_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution
             FROM datasets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item = decode_list_item(&row)?;

        let records = sqlx::query(
            "SELECT equipment_name, equipment_type, flowrate, pressure, temperature
             FROM equipment WHERE dataset_id = ? ORDER BY position",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(decode_record)
        .collect::<RepositoryResult<Vec<_>>>()?;

        tx.commit().await?;

        if records.len() != item.row_count {
            return Err(RepositoryError::corrupt_record(
                "equipment",
                format!(
                    "dataset {} has {} records but row_count {}",
                    id,
                    records.len(),
                    item.row_count
                ),
            ));
        }

        Ok(Some(Dataset {
            id: item.id,
            name: item.name,
            upload_time: item.upload_time,
            row_count: item.row_count,
            summary: item.summary,
            records,
        }))
    }

    async fn list(&self) -> RepositoryResult<Vec<DatasetListItem>> {
        sqlx::query(
            "SELECT id, name, upload_time, row_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution
             FROM datasets ORDER BY upload_time DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(decode_list_item)
        .collect()
    }
}
