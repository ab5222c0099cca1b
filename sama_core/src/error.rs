//! Error types for the sama_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sama_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing file header does not carry the store's key column
    #[error("{path:?} does not contain a '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A stored row could not be turned into a domain record
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Caller-supplied value failed a presence/positivity check
    #[error("Validation error: {0}")]
    Validation(String),
}
