//! Dataset service
//!
//! An upload moves through `received -> parsed -> summarized -> persisted`;
//! any failure before the last step leaves the store untouched.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::summary::SummaryAggregator;
use crate::errors::{AppError, AppResult, ParseError};
use crate::ingestor::CsvParser;
use crate::models::{Dataset, DatasetListItem};
use crate::report::ReportRenderer;
use crate::repositories::DatasetStore;

/// Business operations on uploaded datasets
#[derive(Clone)]
pub struct DatasetService {
    parser: CsvParser,
    store: Arc<dyn DatasetStore>,
    renderer: Arc<dyn ReportRenderer>,
}

impl DatasetService {
    pub fn new(
        parser: CsvParser,
        store: Arc<dyn DatasetStore>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            parser,
            store,
            renderer,
        }
    }

    /// Validate, summarize and persist an uploaded CSV file
    ///
    /// Validation is all-or-nothing: a single bad row rejects the upload and
    /// nothing is stored.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> AppResult<Dataset> {
        debug!("Upload '{}' received ({} bytes)", filename, bytes.len());

        let records = self.parser.parse(bytes).map_err(|e| {
            warn!("Rejected upload '{}': {}", filename, e);
            e
        })?;
        debug!("Upload '{}' parsed: {} records", filename, records.len());

        let summary = SummaryAggregator::summarize(&records).ok_or(ParseError::EmptyFile)?;
        debug!(
            "Upload '{}' summarized: {} types",
            filename,
            summary.type_distribution.len()
        );

        let dataset = self.store.save(filename, &records, &summary).await?;
        info!(
            "Dataset {} persisted from '{}' ({} records)",
            dataset.id, filename, dataset.row_count
        );

        Ok(dataset)
    }

    pub async fn get_dataset(&self, id: i64) -> AppResult<Option<Dataset>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Dataset history, newest first
    pub async fn list_datasets(&self) -> AppResult<Vec<DatasetListItem>> {
        Ok(self.store.list().await?)
    }

    /// Render the report for dataset `id`
    pub async fn get_report(&self, id: i64) -> AppResult<Vec<u8>> {
        let dataset = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Dataset", id.to_string()))?;

        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&dataset))
            .await
            .map_err(|e| AppError::internal(format!("Report task failed: {}", e)))?;

        rendered.map_err(|e| {
            error!("Failed to render report for dataset {}: {}", id, e);
            AppError::from(e)
        })
    }

    pub fn report_content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// Download name for the report of dataset `id`
    pub fn report_filename(&self, id: i64) -> String {
        format!("dataset_{}_report.{}", id, self.renderer.file_extension())
    }
}
