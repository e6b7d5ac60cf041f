//! Error types for the devicecode library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for devicecode operations.
///
/// Data-quality problems inside field values are never reported through this
/// type; they end up as [`QualityNote`](crate::normalize::QualityNote)s on the
/// record instead.
#[derive(Debug, Error)]
pub enum DeviceCodeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed MediaWiki XML dump.
    #[error("Dump error in '{path}': {message}")]
    Dump { path: PathBuf, message: String },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input file has no usable data.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The page does not describe a device (no infobox template).
    #[error("Page '{title}' has no device infobox")]
    NotADevice { title: String },

    /// A page lacks a field required to identify the device.
    #[error("Page '{title}' is missing required identity field '{field}'")]
    MissingIdentity { title: String, field: String },

    /// Structural error in a filter query.
    #[error("Invalid query token '{token}': {message}")]
    Query { token: String, message: String },

    /// Malformed reference table.
    #[error("Reference data error: {0}")]
    Reference(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence error (saving/loading device records).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl DeviceCodeError {
    /// Build a query error for the offending token.
    pub fn query(token: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceCodeError::Query {
            token: token.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for devicecode operations.
pub type Result<T> = std::result::Result<T, DeviceCodeError>;
