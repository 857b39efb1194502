//! Error types for tabular operations.

use thiserror::Error;

/// Errors from source table construction and access.
#[derive(Debug, Error)]
pub enum TabularError {
    /// Schema or structural error (column count mismatch, row count mismatch, etc.)
    #[error("Schema error: {0}")]
    Schema(String),

    /// A record could not be turned into a table row
    #[error("Invalid record at row {row}: {message}")]
    Record { row: usize, message: String },
}

/// Result type for tabular operations.
pub type Result<T> = std::result::Result<T, TabularError>;
