//! Error type definitions for the dataset service
//!
//! The hierarchy mirrors the pipeline: parsing, persistence and rendering each
//! own an error enum, and [`AppError`] wraps them for the service and web
//! layers.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The uploaded CSV was rejected
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Report rendering errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Request validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Request body larger than the configured upload limit
    #[error("Upload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Resource not found errors
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Reasons an uploaded CSV is rejected as a whole
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No data rows (blank input or header only)
    #[error("CSV file contains no data rows")]
    EmptyFile,

    /// A required column is missing from the header row
    #[error("CSV is missing required column '{name}' (expected columns: Equipment Name, Type, Flowrate, Pressure, Temperature)")]
    MissingColumn { name: String },

    /// A data row failed validation; `row_index` is 1-based, header excluded
    #[error("Invalid value in row {row_index} for field '{field}': {reason}")]
    InvalidRow {
        row_index: usize,
        field: String,
        reason: String,
    },

    /// The header itself could not be decoded
    #[error("Malformed CSV: {message}")]
    Malformed { message: String },

    /// The file has more data rows than the configured limit
    #[error("CSV exceeds the maximum of {limit} data rows")]
    TooManyRows { limit: usize },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// SQL query execution failures with context
    #[error("Query failed: {query} - {message}")]
    QueryFailed { query: String, message: String },

    /// Data serialization/deserialization failures
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Migration failures
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed { version: String, message: String },

    /// Stored data violates a model invariant
    #[error("Corrupt record in {table}: {message}")]
    CorruptRecord { table: String, message: String },
}

/// Report rendering errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// A dataset without records reached the generator
    #[error("Dataset {dataset_id} has no records to report")]
    EmptyDataset { dataset_id: i64 },

    /// The PDF backend failed
    #[error("Rendering failed: {message}")]
    Render { message: String },
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the failure was caused by the client's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::Validation { .. }
                | Self::PayloadTooLarge { .. }
                | Self::NotFound { .. }
        )
    }
}

impl ParseError {
    /// Create an invalid row error
    pub fn invalid_row<F: Into<String>, R: Into<String>>(
        row_index: usize,
        field: F,
        reason: R,
    ) -> Self {
        Self::InvalidRow {
            row_index,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column<N: Into<String>>(name: N) -> Self {
        Self::MissingColumn { name: name.into() }
    }
}

impl RepositoryError {
    /// Create a query failed error
    pub fn query_failed<Q: Into<String>, M: Into<String>>(query: Q, message: M) -> Self {
        Self::QueryFailed {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create a corrupt record error
    pub fn corrupt_record<T: Into<String>, M: Into<String>>(table: T, message: M) -> Self {
        Self::CorruptRecord {
            table: table.into(),
            message: message.into(),
        }
    }
}

impl ReportError {
    /// Create a rendering error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}
