//! Error types for subgroup_center

use thiserror::Error;

/// Main error type for quantile estimation and centering
#[derive(Error, Debug)]
pub enum CenteringError {
    #[error("Shape error: {reason}")]
    Shape { reason: String },

    #[error("Label error: {reason}")]
    Label { reason: String },

    #[error("No quantile value provided for gene '{gene_id}'")]
    MissingKey { gene_id: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for centering operations
pub type Result<T> = std::result::Result<T, CenteringError>;
