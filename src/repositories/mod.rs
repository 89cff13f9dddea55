//! Repository pattern implementation for data access
//!
//! Business logic talks to the [`DatasetStore`] trait; the SQLite-backed
//! [`DatasetRepository`] is the production implementation.

pub mod dataset;
pub mod traits;

pub use dataset::DatasetRepository;
pub use traits::*;
