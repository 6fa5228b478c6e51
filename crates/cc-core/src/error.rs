//! Error types for ChurnCause

use thiserror::Error;

/// ChurnCause error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited-text parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Table does not have the expected columns or column types
    #[error("Schema error: {0}")]
    Schema(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// The causal effect cannot be identified from the graph
    #[error("Identification error: {0}")]
    Identification(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
