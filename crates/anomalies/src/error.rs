//! Error types for predictor computations.

use thiserror::Error;

/// Result type for predictor operations.
pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors that can occur while loading panels or computing predictors.
///
/// Arithmetic problems (division by zero, logs of non-positive values,
/// unmatched lags or merges) are never errors; they surface as missing values.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Missing required column in an input table
    #[error("Missing required column '{column}' in table {table}")]
    MissingColumn {
        /// Table that was read
        table: String,
        /// Column that was requested
        column: String,
    },

    /// Input table not found on disk or in memory
    #[error("Missing input table {table}: looked for {searched}")]
    MissingTable {
        /// Logical table name
        table: String,
        /// Locations that were tried
        searched: String,
    },

    /// Panel has more than one row for a key
    #[error("Panel has {duplicates} duplicate rows on ({entity}, {month})")]
    DuplicateKeys {
        /// Entity key column
        entity: String,
        /// Month key column
        month: String,
        /// Number of surplus rows
        duplicates: usize,
    },

    /// Predictor not found in registry
    #[error("Predictor not found: {0}")]
    NotFound(String),

    /// Required credential absent from the environment
    #[error("Missing credential: {0} must be set")]
    MissingCredential(&'static str),

    /// Configuration value present but unusable
    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig {
        /// Configuration key
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection URL could not be built
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}
