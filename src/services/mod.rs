//! Service layer for business logic
//!
//! Services orchestrate the ingestion pipeline between the web handlers and
//! the repository layer:
//!
//! - Parsing and validating uploaded CSV bytes
//! - Computing dataset summaries
//! - Persisting datasets through the [`DatasetStore`](crate::repositories::DatasetStore) trait
//! - Rendering reports off the async runtime

pub mod dataset;
pub mod summary;

pub use dataset::DatasetService;
pub use summary::SummaryAggregator;
