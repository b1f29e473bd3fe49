//! Error taxonomy for table loading, classification and aggregation

use std::io;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced by the feedback pipeline.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// One or more required columns are absent from the table.
    #[error("table is missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    /// The uploaded content could not be parsed as a table.
    #[error("input is not a readable table: {0}")]
    MalformedInput(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl FeedbackError {
    /// Missing column names when this is a schema error.
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            FeedbackError::Schema { missing } => Some(missing),
            _ => None,
        }
    }
}

/// Result type for the library operations
pub type FeedbackResult<T> = std::result::Result<T, FeedbackError>;
