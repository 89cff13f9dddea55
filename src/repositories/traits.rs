//! Repository trait definitions

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::models::{Dataset, DatasetListItem, DatasetSummary, EquipmentRecord};

/// Persistent dataset history
///
/// Datasets are immutable once saved, so the trait has no update operation.
/// Implementations must make `save` atomic: a dataset is either fully
/// visible to `find_by_id`/`list` or not visible at all.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Persist a new dataset, assigning its id and upload time
    ///
    /// # Returns
    ///
    /// * `Ok(Dataset)` - The dataset exactly as later reads will return it
    /// * `Err(RepositoryError)` - Database or serialization error
    async fn save(
        &self,
        name: &str,
        records: &[EquipmentRecord],
        summary: &DatasetSummary,
    ) -> RepositoryResult<Dataset>;

    /// Find a dataset with all of its records
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Dataset))` - Dataset found
    /// * `Ok(None)` - No dataset with this id
    /// * `Err(RepositoryError)` - Database or other error
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Dataset>>;

    /// All datasets, most recent upload first
    async fn list(&self) -> RepositoryResult<Vec<DatasetListItem>>;
}
