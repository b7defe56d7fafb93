//! Error types for the WSE processing pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the WSE processing pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected run configuration. Fatal: the run aborts before any
    /// calculation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The declared logger-export format is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A record in a logger export could not be parsed. The whole file is
    /// rejected; nothing is partially processed.
    #[error("Malformed record in {source_name} (row {row}): {message}")]
    MalformedRecord {
        /// Name of the offending file.
        source_name: String,
        /// Zero-based data row index.
        row: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    /// Create an unsupported-format error.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Error::UnsupportedFormat(msg.into())
    }

    /// Create a malformed-record error for a row of a named source file.
    pub fn malformed_record(
        source_name: impl Into<String>,
        row: usize,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedRecord {
            source_name: source_name.into(),
            row,
            message: message.into(),
        }
    }
}
