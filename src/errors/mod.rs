//! Centralized error handling for the dataset service
//!
//! This module unifies the error types of every layer so that handlers can
//! map failures to HTTP responses in one place.
//!
//! # Error Categories
//!
//! - **Parse Errors**: rejected CSV uploads (client errors)
//! - **Repository Errors**: SQLite and serialization failures in the store
//! - **Report Errors**: PDF rendering failures
//! - **Validation Errors**: malformed requests that never reach the parser
//!
//! # Usage
//!
//! ```rust
//! use chemviz::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::not_found("Dataset", "42"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for CSV parsing Results
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenience type alias for report rendering Results
pub type ReportResult<T> = Result<T, ReportError>;
